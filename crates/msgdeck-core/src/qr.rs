//! Pairing-code rendering
//!
//! The backend hands out an opaque pairing string while the session is in
//! SCAN_QR; the phone pairs by scanning it. This module encodes exactly
//! that string as a QR module matrix and renders it with half-block
//! characters so it is scannable straight off the terminal.
//!
//! The matrix is rebuilt from the freshly polled string every cycle;
//! nothing is cached once the state leaves SCAN_QR.

use qrcode::{Color, QrCode};
use thiserror::Error;

/// Light modules drawn around the code so scanners can lock on.
const QUIET_ZONE: usize = 2;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("pairing code could not be encoded: {0}")]
    Encode(#[from] qrcode::types::QrError),
}

/// A pairing string encoded as a QR module matrix.
#[derive(Debug, Clone)]
pub struct PairingQr {
    width: usize,
    modules: Vec<bool>,
}

impl PairingQr {
    /// Encode a pairing string. The matrix encodes exactly the input;
    /// decoding the rendered code yields the original string.
    pub fn encode(data: &str) -> Result<Self, QrError> {
        let code = QrCode::new(data.as_bytes())?;
        let width = code.width();
        let modules = code
            .to_colors()
            .iter()
            .map(|color| *color == Color::Dark)
            .collect();
        Ok(Self { width, modules })
    }

    /// Matrix width in modules, excluding the quiet zone.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (x, y) is dark. Coordinates outside the
    /// matrix, including the quiet zone, are light.
    fn is_dark(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }

    /// Render with half-block characters, two module rows per text line.
    ///
    /// Terminals are usually light-on-dark, so light modules become block
    /// glyphs and dark modules become the (dark) background; scanners read
    /// that inversion fine.
    pub fn to_half_blocks(&self) -> String {
        let span = self.width + 2 * QUIET_ZONE;
        let mut out = String::with_capacity(span * span / 2 + span);
        let mut y = 0usize;
        while y < span {
            for x in 0..span {
                let mx = x as isize - QUIET_ZONE as isize;
                let top_y = y as isize - QUIET_ZONE as isize;
                let top_light = !self.is_dark(mx, top_y);
                // Past the bottom edge counts as quiet zone (light).
                let bottom_light = y + 1 >= span || !self.is_dark(mx, top_y + 1);
                out.push(match (top_light, bottom_light) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            }
            out.push('\n');
            y += 2;
        }
        out
    }

    /// Export as a greyscale bitmap (0 = dark, 255 = light), quiet zone
    /// included, each module scaled to `scale` pixels per side.
    pub fn to_greyscale(&self, scale: usize) -> (usize, Vec<u8>) {
        let span = (self.width + 2 * QUIET_ZONE) * scale;
        let mut pixels = vec![255u8; span * span];
        for y in 0..self.width {
            for x in 0..self.width {
                if !self.is_dark(x as isize, y as isize) {
                    continue;
                }
                let px = (x + QUIET_ZONE) * scale;
                let py = (y + QUIET_ZONE) * scale;
                for dy in 0..scale {
                    let row = (py + dy) * span;
                    for dx in 0..scale {
                        pixels[row + px + dx] = 0;
                    }
                }
            }
        }
        (span, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_code_decodes_back_to_pairing_string() {
        let pairing = "1@abcDEF0123456789,secretpart==,morepayload";
        let qr = PairingQr::encode(pairing).expect("encode pairing string");

        let (span, pixels) = qr.to_greyscale(4);
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(span, span, |x, y| pixels[y * span + x]);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "exactly one QR code in the bitmap");

        let (_meta, content) = grids[0].decode().expect("decode rendered code");
        assert_eq!(content, pairing);
    }

    #[test]
    fn half_block_render_covers_matrix_and_quiet_zone() {
        let qr = PairingQr::encode("1@abc").expect("encode");
        let text = qr.to_half_blocks();
        let lines: Vec<&str> = text.lines().collect();

        let span = qr.width() + 2 * QUIET_ZONE;
        assert_eq!(lines.len(), span.div_ceil(2));
        for line in &lines {
            assert_eq!(line.chars().count(), span);
        }
        // Quiet zone rows are entirely light.
        assert!(lines[0].chars().all(|c| c == '█'));
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = PairingQr::encode("1@same").expect("encode");
        let b = PairingQr::encode("1@same").expect("encode");
        assert_eq!(a.width(), b.width());
        assert_eq!(a.to_half_blocks(), b.to_half_blocks());
    }

    #[test]
    fn empty_string_still_encodes() {
        // The backend should never serve an empty pairing string, but the
        // renderer must not panic if it does.
        let qr = PairingQr::encode("").expect("encode empty");
        assert!(qr.width() > 0);
    }
}
