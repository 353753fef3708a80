//! Console logging.
//!
//! On wasm32 messages go to the browser devtools console via `web_sys::console`.
//! Native builds (tests, tooling) print to stderr in debug builds only.

#[cfg(target_arch = "wasm32")]
pub fn log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(msg: &str) {
    web_sys::console::warn_1(&msg.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(msg: &str) {
    if cfg!(debug_assertions) {
        eprintln!("[log] {msg}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(msg: &str) {
    if cfg!(debug_assertions) {
        eprintln!("[warn] {msg}");
    }
}
