//! GIF encoding of rendered animations.
//!
//! The two-color [`Palette`] becomes the GIF global color table, so frame
//! indices go on the wire unchanged (0 = background, 1 = foreground). Output
//! goes to any `io::Write` sink in a single pass, and the trailer write is
//! checked before returning.

use std::borrow::Cow;
use std::io::{self, Write};

use log::trace;

use super::lissajous::{Animation, LoopCount, Palette};

/// Errors produced while writing an animation.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Animation has no frames")]
    EmptyAnimation,
    #[error("Frame side {0} exceeds the GIF limit of 65535 pixels")]
    FrameTooLarge(u32),
    #[error("GIF encoding failed: {0}")]
    Encoding(#[from] gif::EncodingError),
    /// Sink write failure (client disconnect etc.)
    #[error("Write failed: {0}")]
    Io(#[from] io::Error),
}

impl From<LoopCount> for gif::Repeat {
    fn from(count: LoopCount) -> Self {
        match count {
            LoopCount::Finite(n) => gif::Repeat::Finite(n),
            LoopCount::Infinite => gif::Repeat::Infinite,
        }
    }
}

/// Global color table: background then foreground, matching the frame indices.
fn color_table(palette: &Palette) -> [u8; 6] {
    let [br, bg, bb] = palette.background;
    let [fr, fg, fb] = palette.foreground;
    [br, bg, bb, fr, fg, fb]
}

/// Encode `animation` as a looping GIF into `out`.
pub fn encode_gif<W: Write>(
    animation: &Animation,
    palette: &Palette,
    out: &mut W,
) -> Result<(), EncodeError> {
    let Some(first) = animation.frames.first() else {
        return Err(EncodeError::EmptyAnimation);
    };
    let side = u16::try_from(first.width()).map_err(|_| EncodeError::FrameTooLarge(first.width()))?;

    let mut encoder = gif::Encoder::new(out, side, side, &color_table(palette))?;
    encoder.set_repeat(animation.loop_count.into())?;

    for (i, frame) in animation.frames.iter().enumerate() {
        let gif_frame = gif::Frame {
            width: side,
            height: side,
            delay: animation.delay_cs,
            buffer: Cow::Borrowed(frame.pixels()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&gif_frame)?;
        trace!("Encoded frame {}/{}", i + 1, animation.frames.len());
    }

    // Writes the trailer; a failure here is a truncated stream
    encoder.into_inner()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lissajous::{AnimationConfig, CurveAnimator};
    use image::{AnimationDecoder, Rgba};
    use image::codecs::gif::GifDecoder;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::{self, Cursor};

    /// Sink that fails every write.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that accepts `limit` bytes, then fails.
    struct CappedSink {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for CappedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"));
            }
            let n = buf.len().min(room);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn small_animator() -> CurveAnimator {
        CurveAnimator::new(AnimationConfig {
            size: 10,
            frames: 2,
            ..Default::default()
        })
    }

    fn encode(animation: &Animation) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode_gif(animation, &Palette::default(), &mut bytes).unwrap();
        bytes
    }

    /// Loop count from the NETSCAPE2.0 application extension.
    fn loop_extension(bytes: &[u8]) -> Option<u16> {
        let tag = b"NETSCAPE2.0";
        let pos = bytes.windows(tag.len()).position(|w| w == tag)?;
        let sub = &bytes[pos + tag.len()..];
        // sub-block: len=3, id=1, u16 little-endian
        if sub.len() >= 4 && sub[0] == 3 && sub[1] == 1 {
            Some(u16::from_le_bytes([sub[2], sub[3]]))
        } else {
            None
        }
    }

    #[test]
    fn test_decodes_to_64_frames_of_201px() {
        let animator = CurveAnimator::default();
        let mut bytes = Vec::new();
        animator
            .write_gif(5, &mut StdRng::seed_from_u64(11), &mut bytes)
            .unwrap();

        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3b));

        let decoder = GifDecoder::new(Cursor::new(bytes)).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 64);

        let black = Rgba([0, 0, 0, 0xff]);
        let green = Rgba([0, 0xff, 0, 0xff]);
        for frame in &frames {
            let buf = frame.buffer();
            assert_eq!(buf.dimensions(), (201, 201));
            assert!(buf.pixels().all(|p| *p == black || *p == green));
            assert_eq!(frame.delay().numer_denom_ms(), (80, 1));
        }
    }

    #[test]
    fn test_fixed_frequency_is_byte_identical() {
        let animator = CurveAnimator::default();
        let a = encode(&animator.render_with_frequency(5, 1.7));
        let b = encode(&animator.render_with_frequency(5, 1.7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_loop_count_reuses_frame_count() {
        let animator = CurveAnimator::new(AnimationConfig {
            size: 10,
            ..Default::default()
        });
        let bytes = encode(&animator.render_with_frequency(1, 1.0));
        assert_eq!(loop_extension(&bytes), Some(64));
    }

    #[test]
    fn test_infinite_loop_override() {
        let animator = CurveAnimator::new(AnimationConfig {
            size: 10,
            frames: 4,
            loop_count: LoopCount::Infinite,
            ..Default::default()
        });
        let bytes = encode(&animator.render_with_frequency(1, 1.0));
        assert_eq!(loop_extension(&bytes), Some(0));
    }

    #[test]
    fn test_sink_failure_propagates() {
        let result = small_animator().write_gif(1, &mut StdRng::seed_from_u64(1), &mut BrokenPipe);
        assert!(matches!(result, Err(EncodeError::Encoding(_) | EncodeError::Io(_))));
    }

    #[test]
    fn test_trailer_write_failure_propagates() {
        let anim = small_animator().render_with_frequency(1, 1.0);
        let full = encode(&anim);

        let mut sink = CappedSink {
            written: Vec::new(),
            limit: full.len() - 1,
        };
        let result = encode_gif(&anim, &Palette::default(), &mut sink);
        assert!(matches!(result, Err(EncodeError::Io(_))));
        assert_eq!(sink.written, full[..full.len() - 1]);
    }

    #[test]
    fn test_palette_order_kept_on_wire() {
        // Background sorts after foreground by color value
        let palette = Palette {
            background: [0xff, 0xff, 0xff],
            foreground: [0x00, 0x00, 0x00],
        };
        let animator = CurveAnimator::new(AnimationConfig {
            size: 10,
            frames: 2,
            palette,
            ..Default::default()
        });
        let mut bytes = Vec::new();
        animator
            .write_gif(1, &mut StdRng::seed_from_u64(5), &mut bytes)
            .unwrap();

        // Header (6) + screen descriptor (7), then the global color table
        assert_eq!(bytes[13..19], [0xff, 0xff, 0xff, 0x00, 0x00, 0x00]);

        let frames = GifDecoder::new(Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        let buf = frames[0].buffer();
        // Corner is never reached by the curve; the center always is (t = 0)
        assert_eq!(*buf.get_pixel(0, 0), Rgba([0xff, 0xff, 0xff, 0xff]));
        assert_eq!(*buf.get_pixel(10, 10), Rgba([0x00, 0x00, 0x00, 0xff]));
    }

    #[test]
    fn test_empty_animation_rejected() {
        let animator = CurveAnimator::new(AnimationConfig {
            frames: 0,
            ..Default::default()
        });
        let anim = animator.render_with_frequency(1, 1.0);
        let mut bytes = Vec::new();
        let result = encode_gif(&anim, &Palette::default(), &mut bytes);
        assert!(matches!(result, Err(EncodeError::EmptyAnimation)));
        assert!(bytes.is_empty());
    }
}
