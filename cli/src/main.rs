mod highlighter;
mod lexer;

use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, EditCommand, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, Reedline, ReedlineEvent, Signal, ValidationResult, Validator,
    default_emacs_keybindings,
};
use std::io::BufRead;
use std::io::BufReader;
use tumble::{Engine, EngineOptions, ExecutionOptions, StepperPath, render_error};

/// tumble - evaluate code on a non-recursive trampoline
#[derive(Parser, Debug)]
#[command(name = "tumble")]
#[command(about = "Evaluate tumble code", long_about = None)]
struct Args {
    /// Maximum number of levels on the evaluation stack
    #[arg(long, default_value_t = ExecutionOptions::default().max_depth)]
    max_depth: usize,

    /// How the evaluator runs each step
    #[arg(long, value_enum, default_value_t = Stepper::Auto)]
    stepper: Stepper,

    /// Log every trampoline cycle (overridden by RUST_LOG)
    #[arg(long)]
    trace: bool,

    /// Code to evaluate (if not provided, reads from stdin)
    expression: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Stepper {
    Auto,
    Inline,
    Sublevel,
}

impl From<Stepper> for StepperPath {
    fn from(stepper: Stepper) -> Self {
        match stepper {
            Stepper::Auto => StepperPath::Auto,
            Stepper::Inline => StepperPath::Inline,
            Stepper::Sublevel => StepperPath::Sublevel,
        }
    }
}

/// Keeps reading lines while brackets or text are left open.
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match lexer::calculate_depth(line) {
            Some(0) => ValidationResult::Complete,
            _ => ValidationResult::Incomplete,
        }
    }
}

fn add_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let mut keybindings = default_emacs_keybindings();
    add_keybindings(&mut keybindings);

    let edit_mode = Box::new(Emacs::new(keybindings));

    let mut line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_validator(Box::new(BracketValidator))
        .with_edit_mode(edit_mode);

    if let Some(dir) = dirs::data_dir().map(|dir| dir.join("tumble")) {
        let history = std::fs::create_dir_all(&dir)
            .ok()
            .and_then(|_| FileBackedHistory::with_file(1000, dir.join("history.txt")).ok());
        if let Some(history) = history {
            line_editor = line_editor.with_history(Box::new(history));
        }
    }

    let prompt = DefaultPrompt::new(DefaultPromptSegment::Empty, DefaultPromptSegment::Empty);

    (line_editor, prompt)
}

fn interpret_input(engine: &mut Engine, input: &str) {
    match engine.eval_str(input) {
        Ok(result) => println!("{}", engine.mold(&result)),
        Err(e) => render_error(&e, input, engine.failure_span()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let default = if args.trace { "tumble_core=trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = EngineOptions {
        execution: ExecutionOptions {
            max_depth: args.max_depth,
            stepper: args.stepper.into(),
            ..ExecutionOptions::default()
        },
        ..EngineOptions::default()
    };
    tracing::debug!(?options, "starting engine");
    let mut engine = Engine::new(options, |_| {}).into_diagnostic()?;

    // Check if we have a direct expression argument
    if let Some(expr) = args.expression {
        interpret_input(&mut engine, &expr);
        return Ok(());
    }

    // Otherwise, check if we're in interactive or pipe mode
    let is_interactive = atty::is(atty::Stream::Stdin);

    if is_interactive {
        // Interactive REPL mode
        let (mut line_editor, prompt) = setup_reedline();

        println!("tumble REPL - Type code to evaluate (Ctrl+D or Ctrl+C to exit)");

        loop {
            let sig = match line_editor.read_line(&prompt) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match sig {
                Signal::Success(buffer) => interpret_input(&mut engine, &buffer),
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    } else {
        // Pipe/stdin mode
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error reading line from stdin: {}", e);
                    return Ok(());
                }
            };

            interpret_input(&mut engine, &line);
        }
    }

    Ok(())
}
