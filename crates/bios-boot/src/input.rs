use async_trait::async_trait;
use bios_core::BiosError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Where an appointed producer or participant gets the kickstart text
/// published by the boot node.
#[async_trait]
pub trait KickstartSource: Send {
    /// Return the next block of kickstart text. Blocks until it arrives.
    async fn read_block(&mut self) -> Result<String, BiosError>;
}

#[async_trait]
impl<T: KickstartSource + ?Sized> KickstartSource for Box<T> {
    async fn read_block(&mut self) -> Result<String, BiosError> {
        (**self).read_block().await
    }
}

/// Pasted text: leading blank lines are skipped, then lines are collected
/// until the first blank line (or end of input).
pub struct StdinKickstartSource<R = BufReader<tokio::io::Stdin>> {
    reader: R,
}

impl StdinKickstartSource {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdinKickstartSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinKickstartSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> KickstartSource for StdinKickstartSource<R> {
    async fn read_block(&mut self) -> Result<String, BiosError> {
        println!("Please paste the kickstart data you received from the boot node,");
        println!("followed by an empty line:");

        let mut lines = (&mut self.reader).lines();
        let mut block = String::new();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                if block.is_empty() {
                    continue;
                }
                break;
            }
            block.push_str(line);
            block.push('\n');
        }

        if block.is_empty() {
            return Err(BiosError::MalformedHandoff(
                "input closed before any kickstart data was read".into(),
            ));
        }
        Ok(block)
    }
}

/// Kickstart text known up front, e.g. read from a file.
pub struct TextKickstartSource {
    text: Option<String>,
}

impl TextKickstartSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[async_trait]
impl KickstartSource for TextKickstartSource {
    async fn read_block(&mut self) -> Result<String, BiosError> {
        self.text
            .take()
            .ok_or_else(|| BiosError::MalformedHandoff("kickstart text already consumed".into()))
    }
}
