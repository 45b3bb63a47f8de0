//! Line-oriented terminal IO shared by the client and the coordinator.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin};

/// Line reader over standard input.
pub type Input = Lines<BufReader<Stdin>>;

/// A line reader over standard input.
pub fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Show `text` on standard output without a trailing newline.
pub async fn prompt(text: &str) -> std::io::Result<()> {
    prompt_to(&mut tokio::io::stdout(), text).await
}

/// Write `text` to `out` and flush, so the prompt is visible before input
/// is read.
pub async fn prompt_to<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_is_written_without_a_newline() {
        let mut out = Vec::new();
        prompt_to(&mut out, "> ").await.unwrap();
        prompt_to(&mut out, "> ").await.unwrap();
        assert_eq!(out, b"> > ");
    }
}
