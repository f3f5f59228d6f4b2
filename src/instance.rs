//! Single-instance guard.
//!
//! On Windows the guard is a named mutex in the session namespace, visible to
//! every process of the current login session. Other platforms only build the
//! app for development, so there the names are tracked per process.

use std::io;

use tracing::debug;

/// Outcome of [`acquire`].
#[derive(Debug)]
pub enum Acquisition {
    Acquired(InstanceGuard),
    AlreadyHeld,
}

/// Ownership of the named lock. Released by [`InstanceGuard::release`] or on drop.
#[derive(Debug)]
pub struct InstanceGuard {
    name: String,
    lock: Option<imp::Lock>,
}

/// Try to take the lock called `name`.
///
/// `AlreadyHeld` leaves the existing holder untouched. An error means the OS
/// refused to create the lock at all.
pub fn acquire(name: &str) -> io::Result<Acquisition> {
    match imp::Lock::create(name)? {
        Some(lock) => {
            debug!(name, "Instance lock acquired");
            Ok(Acquisition::Acquired(InstanceGuard {
                name: name.to_string(),
                lock: Some(lock),
            }))
        }
        None => {
            debug!(name, "Instance lock already held");
            Ok(Acquisition::AlreadyHeld)
        }
    }
}

impl InstanceGuard {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Give the lock up so a new instance may start.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release();
            debug!(name = %self.name, "Instance lock released");
        }
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(windows)]
mod imp {
    use std::ffi::OsStr;
    use std::io;
    use std::os::windows::ffi::OsStrExt;

    use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE};
    use windows_sys::Win32::System::Threading::{CreateMutexW, ReleaseMutex};

    #[derive(Debug)]
    pub struct Lock {
        handle: HANDLE,
    }

    impl Lock {
        /// `Ok(None)` when another holder already created the mutex.
        pub fn create(name: &str) -> io::Result<Option<Self>> {
            let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();

            // SAFETY: `wide` is NUL-terminated and outlives the call.
            let handle = unsafe { CreateMutexW(std::ptr::null(), 1, wide.as_ptr()) };
            if handle == 0 {
                return Err(io::Error::last_os_error());
            }

            // SAFETY: reads the calling thread's last-error value.
            if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
                // SAFETY: `handle` was returned by CreateMutexW above.
                unsafe { CloseHandle(handle) };
                return Ok(None);
            }

            Ok(Some(Self { handle }))
        }

        pub fn release(self) {
            // SAFETY: the mutex was created initially owned by this thread.
            unsafe {
                ReleaseMutex(self.handle);
                CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use std::collections::HashSet;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    fn held() -> &'static Mutex<HashSet<String>> {
        static HELD: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
        HELD.get_or_init(|| Mutex::new(HashSet::new()))
    }

    #[derive(Debug)]
    pub struct Lock {
        name: String,
    }

    impl Lock {
        pub fn create(name: &str) -> io::Result<Option<Self>> {
            let mut names = held()
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "instance table poisoned"))?;
            if !names.insert(name.to_string()) {
                return Ok(None);
            }
            Ok(Some(Self {
                name: name.to_string(),
            }))
        }

        pub fn release(self) {
            if let Ok(mut names) = held().lock() {
                names.remove(&self.name);
            }
        }
    }
}
