//! Hardware device layer, compiled only with the `hw-accel` feature since
//! no such devices exist on a typical build host.

use crate::error::KernelError;

/// A handle to one accelerator device instance: open the device node, run a
/// blocking ioctl against a DMA-contiguous buffer, close on drop.
pub trait DeviceHandle: Send {
    fn ioctl_run(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), KernelError>;
}

#[cfg(feature = "hw-accel")]
mod linux {
    use super::*;
    use crate::types::AcceleratorKind;
    use std::fs::{File, OpenOptions};
    use std::os::unix::io::AsRawFd;

    fn device_path(kind: AcceleratorKind, id: usize) -> String {
        match kind {
            AcceleratorKind::FftHw => format!("/dev/fft.{id}"),
            AcceleratorKind::VitHw => format!("/dev/vitdodec.{id}"),
            AcceleratorKind::Cpu => unreachable!("CPU accelerators have no device node"),
        }
    }

    /// One mmap'd DMA-contiguous buffer per opened device: a fixed-size
    /// buffer shared between the driver and userspace for each ioctl call.
    pub struct LinuxAccelDevice {
        file: File,
        buffer: *mut libc::c_void,
        buffer_len: usize,
    }

    // SAFETY: `buffer` is an mmap'd region owned exclusively by this handle;
    // access is always mediated through `&mut self`.
    unsafe impl Send for LinuxAccelDevice {}

    impl LinuxAccelDevice {
        pub fn open(kind: AcceleratorKind, id: usize, buffer_len: usize) -> Result<Self, KernelError> {
            let path = device_path(kind, id);
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&path)
                .map_err(|e| KernelError::DeviceOpen(format!("{path}: {e}")))?;

            let buffer = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    buffer_len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED,
                    file.as_raw_fd(),
                    0,
                )
            };
            if buffer == libc::MAP_FAILED {
                return Err(KernelError::DmaAlloc(buffer_len));
            }

            Ok(LinuxAccelDevice { file, buffer, buffer_len })
        }
    }

    impl Drop for LinuxAccelDevice {
        fn drop(&mut self) {
            unsafe {
                libc::munmap(self.buffer, self.buffer_len);
            }
        }
    }

    impl DeviceHandle for LinuxAccelDevice {
        fn ioctl_run(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), KernelError> {
            if input.len() > self.buffer_len || output.len() > self.buffer_len {
                return Err(KernelError::DmaAlloc(input.len().max(output.len())));
            }
            unsafe {
                std::ptr::copy_nonoverlapping(input.as_ptr(), self.buffer as *mut u8, input.len());
            }

            const ACCEL_RUN_IOCTL: libc::c_ulong = 1;
            let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), ACCEL_RUN_IOCTL) };
            if rc < 0 {
                return Err(KernelError::Ioctl(std::io::Error::last_os_error().to_string()));
            }

            unsafe {
                std::ptr::copy_nonoverlapping(self.buffer as *const u8, output.as_mut_ptr(), output.len());
            }
            Ok(())
        }
    }
}

#[cfg(feature = "hw-accel")]
pub use linux::LinuxAccelDevice;
