use anyhow::{anyhow, Result};

/// Gemini TTS output format: 24 kHz, mono, signed 16-bit little-endian PCM.
pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const HEADER_SIZE: usize = 44;

const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_SIZE: u32 = 16;

/// `(riff_size, data_size)` for a payload of `len` bytes. RIFF sizes are 32-bit.
fn chunk_sizes(len: usize) -> Result<(u32, u32)> {
    let data_size = u32::try_from(len)
        .map_err(|_| anyhow!("PCM payload of {} bytes exceeds the WAV size limit", len))?;
    let riff_size = data_size
        .checked_add((HEADER_SIZE - 8) as u32)
        .ok_or_else(|| anyhow!("PCM payload of {} bytes exceeds the WAV size limit", len))?;
    Ok((riff_size, data_size))
}

/// Wraps raw PCM samples in a canonical 44-byte RIFF/WAVE header.
/// The payload is copied verbatim; empty input gives a header-only, silent file.
pub fn encode_wav(pcm: &[u8]) -> Result<Vec<u8>> {
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = SAMPLE_RATE * block_align as u32;
    let (riff_size, data_size) = chunk_sizes(pcm.len())?;

    let mut out = Vec::with_capacity(HEADER_SIZE + pcm.len());

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);

    Ok(out)
}

/// Fields of a canonical 44-byte WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(anyhow!("WAV data too short: {} bytes", bytes.len()));
        }
        if &bytes[0..4] != b"RIFF" {
            return Err(anyhow!("Not a RIFF file"));
        }
        if &bytes[8..12] != b"WAVE" {
            return Err(anyhow!("Not a WAVE file"));
        }
        if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
            return Err(anyhow!("Not a canonical WAV header"));
        }

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Ok(Self {
            riff_size: u32_at(4),
            audio_format: u16_at(20),
            channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_size: u32_at(40),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        if self.byte_rate == 0 {
            return 0.0;
        }
        self.data_size as f64 / self.byte_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_header_only() -> Result<()> {
        let wav = encode_wav(&[])?;
        assert_eq!(wav.len(), 44);

        let header = WavHeader::parse(&wav)?;
        assert_eq!(header.data_size, 0);
        assert_eq!(header.riff_size, 36);
        Ok(())
    }

    #[test]
    fn test_header_layout() -> Result<()> {
        let pcm: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let wav = encode_wav(&pcm)?;

        assert_eq!(wav.len(), pcm.len() + 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(&wav[44..], &pcm[..]);

        let header = WavHeader::parse(&wav)?;
        assert_eq!(header.riff_size, wav.len() as u32 - 8);
        assert_eq!(header.audio_format, 1);
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 24_000);
        assert_eq!(header.byte_rate, 48_000);
        assert_eq!(header.block_align, 2);
        assert_eq!(header.bits_per_sample, 16);
        assert_eq!(header.data_size, 1000);
        Ok(())
    }

    #[test]
    fn test_encoding_is_deterministic() -> Result<()> {
        let pcm = vec![0x12, 0x34, 0x56, 0x78];
        assert_eq!(encode_wav(&pcm)?, encode_wav(&pcm)?);
        Ok(())
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let max = u32::MAX as usize;
        assert_eq!(chunk_sizes(max - 36).unwrap(), (u32::MAX, u32::MAX - 36));
        assert!(chunk_sizes(max - 35).is_err());
        assert!(chunk_sizes(max).is_err());
        #[cfg(target_pointer_width = "64")]
        assert!(chunk_sizes(max + 1).is_err());
    }

    #[test]
    fn test_duration() -> Result<()> {
        let wav = encode_wav(&vec![0u8; 48_000 * 2])?;
        let header = WavHeader::parse(&wav)?;
        assert!((header.duration_secs() - 2.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_non_wav() {
        assert!(WavHeader::parse(b"not a wav").is_err());
        let mut wav = encode_wav(&[0, 0]).unwrap();
        wav[0..4].copy_from_slice(b"RIFX");
        assert!(WavHeader::parse(&wav).is_err());
    }
}
