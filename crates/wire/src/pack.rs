//! Word-oriented packed codec.
//!
//! Each word is preceded by a tag byte whose bits mark its nonzero byte
//! positions, followed by those bytes. Two tags extend into runs: `0x00` is
//! followed by a count of additional all-zero words, and `0xff` is followed
//! by the literal word and a count of further literal words.

use crate::error::{Error, Result};
use crate::pointer::WORD_SIZE;

/// Packs a word-aligned buffer.
pub fn pack(unpacked: &[u8]) -> Result<Vec<u8>> {
	if unpacked.len() % WORD_SIZE != 0 {
		return Err(Error::UnalignedInput(unpacked.len()));
	}
	let words: Vec<&[u8]> = unpacked.chunks_exact(WORD_SIZE).collect();
	let mut out = Vec::with_capacity(unpacked.len() / 2);
	let mut index = 0;
	while index < words.len() {
		let word = words[index];
		let tag = tag_byte(word);
		out.push(tag);
		match tag {
			0x00 => {
				let mut run = 0usize;
				while run < 255 && index + 1 + run < words.len() && is_zero(words[index + 1 + run]) {
					run += 1;
				}
				out.push(run as u8);
				index += 1 + run;
			}
			0xff => {
				out.extend_from_slice(word);
				let start = index + 1;
				let mut run = 0usize;
				while run < 255 && start + run < words.len() && !words[start + run].contains(&0) {
					run += 1;
				}
				out.push(run as u8);
				for literal in &words[start..start + run] {
					out.extend_from_slice(literal);
				}
				index = start + run;
			}
			_ => {
				out.extend(word.iter().filter(|&&byte| byte != 0));
				index += 1;
			}
		}
	}
	Ok(out)
}

/// Unpacks a packed buffer back into word-aligned bytes.
pub fn unpack(packed: &[u8]) -> Result<Vec<u8>> {
	let mut out = Vec::with_capacity(packed.len() * 2);
	let mut index = 0;
	while index < packed.len() {
		let tag = packed[index];
		index += 1;
		let mut word = [0u8; WORD_SIZE];
		for (bit, byte) in word.iter_mut().enumerate() {
			if tag & (1 << bit) != 0 {
				*byte = *packed.get(index).ok_or(Error::TruncatedPacked)?;
				index += 1;
			}
		}
		out.extend_from_slice(&word);
		if tag == 0x00 {
			let run = *packed.get(index).ok_or(Error::TruncatedPacked)? as usize;
			index += 1;
			out.resize(out.len() + run * WORD_SIZE, 0);
		} else if tag == 0xff {
			let run = *packed.get(index).ok_or(Error::TruncatedPacked)? as usize;
			index += 1;
			let bytes = run * WORD_SIZE;
			let literal = packed.get(index..index + bytes).ok_or(Error::TruncatedPacked)?;
			out.extend_from_slice(literal);
			index += bytes;
		}
	}
	Ok(out)
}

fn tag_byte(word: &[u8]) -> u8 {
	word.iter().enumerate().fold(0, |tag, (bit, &byte)| if byte != 0 { tag | 1 << bit } else { tag })
}

fn is_zero(word: &[u8]) -> bool {
	word.iter().all(|&byte| byte == 0)
}
