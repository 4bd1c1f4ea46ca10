use std::{
    io::{self, Read, Write},
    os::fd::{AsFd, AsRawFd as _, BorrowedFd, IntoRawFd as _, OwnedFd, RawFd},
};

use nix::unistd;

use crate::error::CpuApiError;

/// Creates a unidirectional pipe and returns its read and write ends.
///
/// Both ends are inherited by every process forked afterwards. Each process
/// must close the ends it does not use, or readers never observe end of
/// stream.
pub fn pipe() -> Result<(PipeReader, PipeWriter), CpuApiError> {
    let (rx, tx) = unistd::pipe()?;
    Ok((PipeReader(rx), PipeWriter(tx)))
}

#[derive(Debug)]
pub struct PipeReader(OwnedFd);

#[derive(Debug)]
pub struct PipeWriter(OwnedFd);

impl PipeReader {
    pub fn try_clone(&self) -> Result<Self, CpuApiError> {
        Ok(Self(self.0.try_clone()?))
    }

    /// Reads a single byte, returning `None` at end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>, CpuApiError> {
        let mut buf = [0];
        loop {
            match unistd::read(self.0.as_raw_fd(), &mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(nix::errno::Errno::EINTR) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Closes the read end, reporting errors that dropping would ignore.
    pub fn close(self) -> Result<(), CpuApiError> {
        close_fd(self.0)
    }
}

impl PipeWriter {
    pub fn try_clone(&self) -> Result<Self, CpuApiError> {
        Ok(Self(self.0.try_clone()?))
    }

    /// Closes the write end, reporting errors that dropping would ignore.
    ///
    /// Readers see end of stream once every copy of the write end, in every
    /// process, has been closed.
    pub fn close(self) -> Result<(), CpuApiError> {
        close_fd(self.0)
    }
}

fn close_fd(fd: OwnedFd) -> Result<(), CpuApiError> {
    unistd::close(fd.into_raw_fd())?;
    Ok(())
}

impl AsFd for PipeReader {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl AsFd for PipeWriter {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl std::os::fd::AsRawFd for PipeReader {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

impl std::os::fd::AsRawFd for PipeWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(unistd::read(self.0.as_raw_fd(), buf)?)
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(unistd::write(&self.0, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::os::fd::AsRawFd as _;

    use super::*;

    #[test]
    fn bytes_arrive_in_order_then_eof() {
        let (mut rx, mut tx) = pipe().unwrap();
        tx.write_all(b"hello, pipe").unwrap();
        tx.close().unwrap();

        let mut received = vec![];
        while let Some(b) = rx.read_byte().unwrap() {
            received.push(b);
        }
        assert_eq!(received, b"hello, pipe");
        assert_eq!(rx.read_byte().unwrap(), None);
    }

    #[test]
    fn eof_waits_for_every_writer() {
        let (mut rx, mut tx) = pipe().unwrap();
        let mut tx2 = tx.try_clone().unwrap();

        tx.write_all(b"a").unwrap();
        drop(tx);
        tx2.write_all(b"b").unwrap();

        assert_eq!(rx.read_byte().unwrap(), Some(b'a'));
        assert_eq!(rx.read_byte().unwrap(), Some(b'b'));

        // EOF only once the last copy of the write end is gone
        drop(tx2);
        assert_eq!(rx.read_byte().unwrap(), None);
    }

    #[test]
    fn read_to_end_collects_everything() {
        let (mut rx, mut tx) = pipe().unwrap();
        let msg = (0..=255).collect::<Vec<u8>>();
        tx.write_all(&msg).unwrap();
        drop(tx);

        let mut buf = vec![];
        rx.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, msg);
    }

    #[test]
    fn broken_pipe() {
        let (rx, mut tx) = pipe().unwrap();
        drop(rx);
        let err = tx.write_all(&[1, 2, 3]).unwrap_err();
        assert!(matches!(CpuApiError::from(err), CpuApiError::BrokenPipe));
    }

    #[test]
    fn pipe_bad_fd() {
        let (rx, tx) = pipe().unwrap();
        assert_eq!(
            unistd::write(rx.as_fd(), &[0]),
            Err(nix::errno::Errno::EBADF)
        );
        assert_eq!(
            unistd::read(tx.as_raw_fd(), &mut [0]),
            Err(nix::errno::Errno::EBADF)
        );
    }
}
