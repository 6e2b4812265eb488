use std::io::{self, Read, Seek, SeekFrom};

use crate::container::Container;
use crate::Error;

/// `Read + Seek` view over the logical bytes of a container.
///
/// Reads go through the chunk cache. Seeking past the end is allowed and
/// subsequent reads return 0.
pub struct ContainerReader<'a> {
    container: &'a Container,
    pos: u64,
}

impl<'a> ContainerReader<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self { container, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl Read for ContainerReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.container.len() {
            return Ok(0);
        }
        let n = self.container.read_at(self.pos, buf).map_err(into_io)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ContainerReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(offset) => {
                self.pos = offset;
                return Ok(offset);
            }
            SeekFrom::End(delta) => (self.container.len(), delta),
            SeekFrom::Current(delta) => (self.pos, delta),
        };
        match base.checked_add_signed(delta) {
            Some(next) => {
                self.pos = next;
                Ok(next)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

fn into_io(err: Error) -> io::Error {
    match err {
        Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
