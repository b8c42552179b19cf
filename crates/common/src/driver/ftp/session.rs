use std::io::{Read, Write};

use crate::error::BackendError;

/// The FTP commands the driver relies on, issued over one control
/// connection.
///
/// [`connect`](super::connect) provides the implementation over a real
/// server; tests plug in an in-memory one.
pub trait FtpSession {
    /// `NLST`: entry names of a directory, as the server reports them.
    fn name_list(&mut self, path: &str) -> Result<Vec<String>, BackendError>;

    /// `LIST`: raw, line-oriented directory listing.
    fn raw_list(&mut self, path: &str) -> Result<Vec<String>, BackendError>;

    /// `MKD`
    fn make_dir(&mut self, path: &str) -> Result<(), BackendError>;

    /// `RMD`
    fn remove_dir(&mut self, path: &str) -> Result<(), BackendError>;

    /// `DELE`
    fn remove_file(&mut self, path: &str) -> Result<(), BackendError>;

    /// `STOR`, returning the number of bytes sent.
    fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<u64, BackendError>;

    /// `RETR`, streaming into `writer` and returning the number of bytes
    /// received.
    fn get(&mut self, path: &str, writer: &mut dyn Write) -> Result<u64, BackendError>;

    /// The first `limit` bytes of `path`. The transfer is aborted once
    /// they have arrived.
    fn get_head(&mut self, path: &str, limit: usize) -> Result<Vec<u8>, BackendError>;

    /// `QUIT`
    fn quit(&mut self) -> Result<(), BackendError>;
}

#[cfg(feature = "ftp")]
mod suppaftp_session {
    use std::io::{self, Read, Write};

    use suppaftp::{FtpError, FtpStream, NativeTlsFtpStream};

    use super::FtpSession;
    use crate::error::BackendError;

    fn backend(error: FtpError) -> BackendError {
        let status = match &error {
            FtpError::UnexpectedResponse(response) => Some(response.status.code()),
            _ => None,
        };
        BackendError::ftp(status, error.to_string())
    }

    macro_rules! impl_ftp_session {
        ($stream:ty) => {
            impl FtpSession for $stream {
                fn name_list(&mut self, path: &str) -> Result<Vec<String>, BackendError> {
                    self.nlst(Some(path)).map_err(backend)
                }

                fn raw_list(&mut self, path: &str) -> Result<Vec<String>, BackendError> {
                    self.list(Some(path)).map_err(backend)
                }

                fn make_dir(&mut self, path: &str) -> Result<(), BackendError> {
                    self.mkdir(path).map_err(backend)
                }

                fn remove_dir(&mut self, path: &str) -> Result<(), BackendError> {
                    self.rmdir(path).map_err(backend)
                }

                fn remove_file(&mut self, path: &str) -> Result<(), BackendError> {
                    self.rm(path).map_err(backend)
                }

                fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<u64, BackendError> {
                    let mut reader = reader;
                    self.put_file(path, &mut reader).map_err(backend)
                }

                fn get(&mut self, path: &str, writer: &mut dyn Write) -> Result<u64, BackendError> {
                    self.retr(path, |reader| {
                        io::copy(reader, &mut *writer).map_err(FtpError::ConnectionError)
                    })
                    .map_err(backend)
                }

                fn get_head(&mut self, path: &str, limit: usize) -> Result<Vec<u8>, BackendError> {
                    let stream = self.retr_as_stream(path).map_err(backend)?;
                    // One byte past the limit tells a short file from a long one.
                    let mut reader = stream.take(limit as u64 + 1);
                    let mut head = Vec::with_capacity(limit + 1);
                    reader
                        .read_to_end(&mut head)
                        .map_err(|e| backend(FtpError::ConnectionError(e)))?;
                    let stream = reader.into_inner();
                    if head.len() > limit {
                        head.truncate(limit);
                        self.abort(stream).map_err(backend)?;
                    } else {
                        self.finalize_retr_stream(stream).map_err(backend)?;
                    }
                    Ok(head)
                }

                fn quit(&mut self) -> Result<(), BackendError> {
                    <$stream>::quit(self).map_err(backend)
                }
            }
        };
    }

    impl_ftp_session!(FtpStream);
    impl_ftp_session!(NativeTlsFtpStream);
}
