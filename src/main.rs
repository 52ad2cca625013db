use std::io::{self, BufRead, Write};

use wisp::EvaluationContext;

fn main() -> anyhow::Result<()> {
    let mut context = EvaluationContext::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "wisp> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match context.evaluate_str(&line) {
            Ok(value) => println!("{}", value),
            Err(error) => println!("error: {}", error),
        }
    }
}
