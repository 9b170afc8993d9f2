use crate::detect::DetectError;

/// RAII guard for COM initialization on the current thread.
pub struct ComGuard;

impl ComGuard {
    pub fn initialize() -> Result<Self, DetectError> {
        unsafe {
            windows::Win32::System::Com::CoInitializeEx(
                Some(std::ptr::null()),
                windows::Win32::System::Com::COINIT_MULTITHREADED,
            )
            .ok()
            .map_err(|e| DetectError::Engine(format!("Failed to initialize COM: {e}")))?;
        }
        Ok(ComGuard)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            windows::Win32::System::Com::CoUninitialize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_can_be_reacquired_after_drop() {
        {
            let _guard = ComGuard::initialize().unwrap();
        }
        assert!(ComGuard::initialize().is_ok());
    }
}
