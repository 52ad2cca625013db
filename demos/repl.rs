use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use wisp::EvaluationContext;

async fn query(
    stdout: &mut io::Stdout,
    lines: &mut io::Lines<io::BufReader<io::Stdin>>,
) -> io::Result<Option<String>> {
    stdout.write_all("wisp> ".as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

#[tokio::main]
async fn main() {
    let mut context = EvaluationContext::new();
    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Ok(Some(line)) = query(&mut stdout, &mut lines).await {
        if line.trim().is_empty() {
            continue;
        }

        match context.evaluate_str(&line) {
            Ok(value) => println!("{}", value),
            Err(error) => println!("error: {}", error),
        }
    }
}
