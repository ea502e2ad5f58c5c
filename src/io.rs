//! Byte channels for `,` and `.`.

use std::io::{self, BufWriter, Read, Stdin, Stdout, Write};

/// The engine's view of program I/O: one byte in, one byte out.
pub trait IoChannel {
    /// Read one byte, blocking if needed. `Ok(None)` means end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write one byte, blocking if needed.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Push any buffered output to its destination.
    fn flush(&mut self) -> io::Result<()>;
}

impl<T: IoChannel + ?Sized> IoChannel for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// An [`IoChannel`] over any reader/writer pair.
///
/// Pending output is flushed before every read so prompts are visible
/// before the program blocks on input.
#[derive(Debug)]
pub struct Streams<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> Streams<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl Streams<Stdin, BufWriter<Stdout>> {
    /// Process stdin and a buffered stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin(), BufWriter::new(io::stdout()))
    }
}

impl<R: Read, W: Write> IoChannel for Streams<R, W> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.output.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn reads_bytes_until_end_of_input() {
        let mut streams = Streams::new(&b"ab"[..], Vec::new());
        assert_eq!(streams.read_byte().unwrap(), Some(b'a'));
        assert_eq!(streams.read_byte().unwrap(), Some(b'b'));
        assert_eq!(streams.read_byte().unwrap(), None);
    }

    #[test]
    fn writes_raw_bytes() {
        let mut streams = Streams::new(io::empty(), Vec::new());
        streams.write_byte(0xff).unwrap();
        streams.write_byte(b'\n').unwrap();
        assert_eq!(streams.output(), &vec![0xff, b'\n']);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut streams = Streams::new(io::empty(), FailingWriter);
        let err = streams.write_byte(b'x').unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
