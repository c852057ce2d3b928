//! Quadwarp WASM - WebAssembly bindings for Quadwarp
//!
//! This crate exposes the quadwarp-core perspective warp to JavaScript and
//! TypeScript applications. The usual host is a canvas UI with four
//! draggable handles: every time a handle moves, the UI calls
//! `warp_perspective` with the new positions and draws the returned pixels.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `transform` - Warp, homography solve and inversion bindings
//! - `codec` - PNG/JPEG decoding and PNG export
//! - `logger` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsRasterImage, warp_perspective } from '@quadwarp/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const src = ctx.getImageData(0, 0, canvas.width, canvas.height);
//! const source = new JsRasterImage(src.width, src.height, new Uint8Array(src.data.buffer));
//!
//! function onHandlesMoved(handles: { x: number; y: number }[]) {
//!   const points = new Float64Array(handles.flatMap((p) => [p.x, p.y]));
//!   const warped = warp_perspective(source, points, out.width, out.height);
//!   const data = new ImageData(new Uint8ClampedArray(warped.pixels()), warped.width);
//!   outCtx.putImageData(data, 0, 0);
//! }
//! ```

use wasm_bindgen::prelude::*;

mod codec;
mod logger;
mod transform;
mod types;

// Re-export public types
pub use codec::{decode_image, encode_png};
pub use logger::set_log_level;
pub use transform::{
    compute_homography, invert_homography, warp_perspective, warp_perspective_with_options,
};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
///
/// Installs the console logger at `warn` level. Use `set_log_level` to see
/// more.
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Warn);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
