use std::io::{self, ErrorKind, Read};
use std::time::Duration;
use serialport::{ClearBuffer, SerialPort};
use crate::drivers::{AcquisitionError, LineSource};
const READ_TIMEOUT: Duration = Duration::from_millis(10);
const RX_CHUNK: usize = 4096;
/// Newline-delimited sample stream from the microcontroller's USB serial port.
///
/// The port is released when the source is dropped, whichever way the run
/// loop exits.
pub struct SerialLineSource {
    port_name: String,
    port: Box<dyn SerialPort>,
    rx_buf: Vec<u8>,
}
impl SerialLineSource {
    pub fn open(port_name: &str, baud: u32) -> Result<Self, AcquisitionError> {
        let port = serialport::new(port_name, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| AcquisitionError::ConnectionFailure {
                port: port_name.to_string(),
                baud,
                source,
            })?;
        log::info!("connected to {port_name} @ {baud} baud");
        Ok(Self::from_port(port_name, port))
    }
    fn from_port(port_name: &str, port: Box<dyn SerialPort>) -> Self {
        Self {
            port_name: port_name.to_string(),
            port,
            rx_buf: Vec::with_capacity(RX_CHUNK),
        }
    }
    fn has_full_line(&self) -> bool {
        self.rx_buf.contains(&b'\n')
    }
    /// Moves whatever the driver already holds into `rx_buf` without waiting.
    fn fill_nonblocking(&mut self) -> Result<(), AcquisitionError> {
        let waiting = self.port.bytes_to_read()? as usize;
        if waiting > 0 {
            self.read_chunk(waiting.min(RX_CHUNK))?;
        }
        Ok(())
    }
    fn read_chunk(&mut self, len: usize) -> Result<usize, AcquisitionError> {
        let mut chunk = vec![0u8; len.max(1)];
        match self.port.read(&mut chunk) {
            Ok(n) => {
                self.rx_buf.extend_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
impl LineSource for SerialLineSource {
    fn line_available(&mut self) -> Result<bool, AcquisitionError> {
        if self.has_full_line() {
            return Ok(true);
        }
        // An unterminated tail stays buffered until its newline arrives.
        self.fill_nonblocking()?;
        Ok(self.has_full_line())
    }
    fn read_line(&mut self) -> Result<String, AcquisitionError> {
        let end = loop {
            if let Some(end) = self.rx_buf.iter().position(|&b| b == b'\n') {
                break end;
            }
            if self.read_chunk(RX_CHUNK)? == 0 {
                let err = io::Error::new(ErrorKind::TimedOut, "no complete line buffered");
                return Err(err.into());
            }
        };
        let line: Vec<u8> = self.rx_buf.drain(..=end).collect();
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }
    fn clear_input(&mut self) -> Result<(), AcquisitionError> {
        self.rx_buf.clear();
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
impl Drop for SerialLineSource {
    fn drop(&mut self) {
        let _ = self.port.clear(ClearBuffer::All);
        log::info!("serial port {} closed", self.port_name);
    }
}
