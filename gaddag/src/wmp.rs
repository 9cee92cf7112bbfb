/*
 * wmp.rs
 * Part of the gaddag project
 * Created Date: Thursday, March 27th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Fri Jun 13 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Word map: a length-partitioned table from bit-rack multisets to their
//! anagram sets, with separate blankless / single-blank / double-blank
//! sub-tables.
//!
//! Each bucket holds `(quotient, payload)` entries; lookup computes
//! `(quotient, bucket) = divmod(bit_rack, num_buckets)` and linearly scans
//! the bucket for a matching quotient. Small anagram sets are inlined into
//! the entry itself; larger ones point into a side letter-array. The
//! "inlined vs not" discriminant is whether the first payload byte is
//! nonzero, which is legal because any real inlined letter is `>= 1`.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::alphabet::MachineLetter;
use crate::bit_rack::BitRack;
use crate::board::BOARD_DIM;
use crate::error::GaddagError;

const MAX_INLINE_BYTES: usize = 8;

#[derive(Debug, Clone)]
enum Payload {
    /// Up to `MAX_INLINE_BYTES` letters stored directly.
    Inlined(Vec<MachineLetter>),
    /// `(start, count)` into a side letter array owned by the table.
    Pointer(u32, u32),
}

#[derive(Debug, Clone)]
struct Entry {
    quotient: u128,
    payload: Payload,
}

/// One length's blankless bucket table: `bit_rack -> words of that length
/// using exactly that multiset of unblanked tiles`.
#[derive(Debug, Clone)]
pub struct WordsOfSameLength {
    word_len: usize,
    num_buckets: u32,
    buckets: Vec<Vec<Entry>>,
    letters: Vec<MachineLetter>,
}

impl WordsOfSameLength {
    fn build(word_len: usize, words: &[Vec<MachineLetter>]) -> Self {
        let mut by_bit_rack: HashMap<u128, Vec<&Vec<MachineLetter>>> = HashMap::new();
        for w in words {
            let mut br = BitRack::EMPTY;
            for &ml in w.iter() {
                br.add_letter(ml);
            }
            by_bit_rack.entry(br.data()).or_default().push(w);
        }

        let num_buckets = (by_bit_rack.len().max(1) as u32).next_power_of_two().max(1);
        let mut buckets: Vec<Vec<Entry>> = vec![Vec::new(); num_buckets as usize];
        let mut letters = Vec::new();

        for (&data, group) in &by_bit_rack {
            let br = BitRack::new(data);
            let (quotient, bucket_idx) = br.divmod(num_buckets);
            let flat: Vec<MachineLetter> = group.iter().flat_map(|w| w.iter().copied()).collect();
            let payload = if flat.len() <= MAX_INLINE_BYTES {
                Payload::Inlined(flat)
            } else {
                let start = letters.len() as u32;
                letters.extend_from_slice(&flat);
                Payload::Pointer(start, flat.len() as u32)
            };
            buckets[bucket_idx as usize].push(Entry {
                quotient: quotient.data(),
                payload,
            });
        }

        WordsOfSameLength {
            word_len,
            num_buckets,
            buckets,
            letters,
        }
    }

    fn words_for(&self, bit_rack: BitRack) -> Vec<Vec<MachineLetter>> {
        let (quotient, bucket_idx) = bit_rack.divmod(self.num_buckets);
        let Some(bucket) = self.buckets.get(bucket_idx as usize) else {
            return Vec::new();
        };
        let Some(entry) = bucket.iter().find(|e| e.quotient == quotient.data()) else {
            return Vec::new();
        };
        let flat: &[MachineLetter] = match &entry.payload {
            Payload::Inlined(letters) => letters,
            Payload::Pointer(start, count) => {
                &self.letters[*start as usize..(*start + *count) as usize]
            }
        };
        flat.chunks_exact(self.word_len).map(|c| c.to_vec()).collect()
    }

    pub fn has_word(&self, bit_rack: BitRack) -> bool {
        !self.words_for(bit_rack).is_empty()
    }
}

/// The single-blank sub-table: value is a bitmap of letters that complete
/// the `(word_len - 1)`-letter blankless rack into a valid word.
#[derive(Debug, Clone)]
struct SingleBlankTable {
    num_buckets: u32,
    buckets: Vec<Vec<(u128, u32)>>, // (quotient, completing-letter bitmap)
}

impl SingleBlankTable {
    fn build(word_len: usize, words: &[Vec<MachineLetter>]) -> Self {
        // key: bit-rack of the word with one occurrence of each letter
        // removed in turn (i.e. every (len-1)-subset reachable by omitting
        // one tile) -> bitmap of the omitted letters that work.
        let mut by_bit_rack: HashMap<u128, u32> = HashMap::new();
        for w in words {
            for i in 0..w.len() {
                let mut sub = BitRack::EMPTY;
                for (j, &ml) in w.iter().enumerate() {
                    if j != i {
                        sub.add_letter(ml);
                    }
                }
                let bit = 1u32 << w[i];
                *by_bit_rack.entry(sub.data()).or_insert(0) |= bit;
            }
        }
        let _ = word_len;
        let num_buckets = (by_bit_rack.len().max(1) as u32).next_power_of_two().max(1);
        let mut buckets: Vec<Vec<(u128, u32)>> = vec![Vec::new(); num_buckets as usize];
        for (&data, &bitmap) in &by_bit_rack {
            let br = BitRack::new(data);
            let (quotient, bucket_idx) = br.divmod(num_buckets);
            buckets[bucket_idx as usize].push((quotient.data(), bitmap));
        }
        SingleBlankTable { num_buckets, buckets }
    }

    fn completing_letters(&self, bit_rack: BitRack) -> u32 {
        let (quotient, bucket_idx) = bit_rack.divmod(self.num_buckets);
        let Some(bucket) = self.buckets.get(bucket_idx as usize) else {
            return 0;
        };
        bucket
            .iter()
            .find(|&&(q, _)| q == quotient.data())
            .map(|&(_, bitmap)| bitmap)
            .unwrap_or(0)
    }
}

/// The double-blank sub-table: value is the list of completing letter
/// pairs for a `(word_len - 2)`-letter blankless rack.
#[derive(Debug, Clone)]
struct DoubleBlankTable {
    num_buckets: u32,
    buckets: Vec<Vec<(u128, u32, u32)>>, // (quotient, pairs-start, pairs-count)
    pairs: Vec<(MachineLetter, MachineLetter)>,
}

impl DoubleBlankTable {
    fn build(words: &[Vec<MachineLetter>]) -> Self {
        let mut by_bit_rack: HashMap<u128, Vec<(MachineLetter, MachineLetter)>> = HashMap::new();
        for w in words {
            if w.len() < 2 {
                continue;
            }
            for i in 0..w.len() {
                for j in (i + 1)..w.len() {
                    let mut sub = BitRack::EMPTY;
                    for (k, &ml) in w.iter().enumerate() {
                        if k != i && k != j {
                            sub.add_letter(ml);
                        }
                    }
                    let mut pair = (w[i], w[j]);
                    if pair.0 > pair.1 {
                        pair = (pair.1, pair.0);
                    }
                    let entry = by_bit_rack.entry(sub.data()).or_default();
                    if !entry.contains(&pair) {
                        entry.push(pair);
                    }
                }
            }
        }
        let num_buckets = (by_bit_rack.len().max(1) as u32).next_power_of_two().max(1);
        let mut buckets: Vec<Vec<(u128, u32, u32)>> = vec![Vec::new(); num_buckets as usize];
        let mut pairs = Vec::new();
        for (&data, group) in &by_bit_rack {
            let br = BitRack::new(data);
            let (quotient, bucket_idx) = br.divmod(num_buckets);
            let start = pairs.len() as u32;
            pairs.extend_from_slice(group);
            buckets[bucket_idx as usize].push((quotient.data(), start, group.len() as u32));
        }
        DoubleBlankTable {
            num_buckets,
            buckets,
            pairs,
        }
    }

    fn completing_pairs(&self, bit_rack: BitRack) -> Vec<(MachineLetter, MachineLetter)> {
        let (quotient, bucket_idx) = bit_rack.divmod(self.num_buckets);
        let Some(bucket) = self.buckets.get(bucket_idx as usize) else {
            return Vec::new();
        };
        bucket
            .iter()
            .find(|&&(q, _, _)| q == quotient.data())
            .map(|&(_, start, count)| self.pairs[start as usize..(start + count) as usize].to_vec())
            .unwrap_or_default()
    }
}

/// Full word map: one set of sub-tables per word length.
#[derive(Debug, Clone)]
pub struct Wmp {
    by_length: HashMap<usize, WordsOfSameLength>,
    single_blank_by_length: HashMap<usize, SingleBlankTable>,
    double_blank_by_length: HashMap<usize, DoubleBlankTable>,
}

impl Wmp {
    /// Builds every sub-table from a flat list of dictionary words.
    pub fn build(words: &[Vec<MachineLetter>]) -> Self {
        let mut by_length: HashMap<usize, Vec<Vec<MachineLetter>>> = HashMap::new();
        for w in words {
            by_length.entry(w.len()).or_default().push(w.clone());
        }

        let mut blankless = HashMap::new();
        let mut single = HashMap::new();
        let mut double = HashMap::new();
        for (len, group) in &by_length {
            blankless.insert(*len, WordsOfSameLength::build(*len, group));
            single.insert(*len, SingleBlankTable::build(*len, group));
            double.insert(*len, DoubleBlankTable::build(group));
        }

        Wmp {
            by_length: blankless,
            single_blank_by_length: single,
            double_blank_by_length: double,
        }
    }

    pub fn has_word(&self, len: usize, bit_rack: BitRack) -> bool {
        self.by_length
            .get(&len)
            .map(|t| t.has_word(bit_rack))
            .unwrap_or(false)
    }

    pub fn words_of_length(&self, len: usize, bit_rack: BitRack) -> Vec<Vec<MachineLetter>> {
        self.by_length
            .get(&len)
            .map(|t| t.words_for(bit_rack))
            .unwrap_or_default()
    }

    /// Completing letters for a rack with one blank: `bit_rack` is the
    /// blankless part, of length `len - 1`.
    pub fn single_blank_completions(&self, len: usize, bit_rack: BitRack) -> u32 {
        self.single_blank_by_length
            .get(&len)
            .map(|t| t.completing_letters(bit_rack))
            .unwrap_or(0)
    }

    /// Completing letter pairs for a rack with two blanks: `bit_rack` is
    /// the blankless part, of length `len - 2`.
    pub fn double_blank_completions(
        &self,
        len: usize,
        bit_rack: BitRack,
    ) -> Vec<(MachineLetter, MachineLetter)> {
        self.double_blank_by_length
            .get(&len)
            .map(|t| t.completing_pairs(bit_rack))
            .unwrap_or_default()
    }

    /// Dispatches on the number of blanks in the rack, per the source's
    /// `wmp_get_word_entry`.
    pub fn has_word_with_blanks(&self, len: usize, blankless: BitRack, num_blanks: u8) -> bool {
        match num_blanks {
            0 => self.has_word(len, blankless),
            1 => self.single_blank_completions(len, blankless) != 0,
            2 => !self.double_blank_completions(len, blankless).is_empty(),
            _ => false,
        }
    }
}

/// Binary format: a small version/dimension header, then one block per
/// word length `2..=BOARD_DIM`, each block holding its blankless,
/// single-blank, and double-blank sub-tables in CSR-style
/// bucket/quotient/entry form. Buckets are flattened to a contiguous
/// entries array plus a prefix-sum `bucket_starts` array on write, and
/// re-grouped back into `Vec<Vec<_>>` on read.
pub mod io {
    use super::*;

    pub const WMP_FORMAT_VERSION: u32 = 1;
    const MIN_SUPPORTED_VERSION: u32 = 1;

    pub fn write<W: Write>(wmp: &Wmp, mut w: W) -> Result<(), GaddagError> {
        write_u32(&mut w, WMP_FORMAT_VERSION)?;
        write_u32(&mut w, BOARD_DIM as u32)?;
        write_u32(&mut w, MAX_INLINE_BYTES as u32)?;
        write_u32(&mut w, 2)?; // a completing blank pair is always two machine letters

        for len in 2..=BOARD_DIM {
            write_word_block(wmp.by_length.get(&len), len, &mut w)?;
            write_single_blank_block(wmp.single_blank_by_length.get(&len), &mut w)?;
            write_double_blank_block(wmp.double_blank_by_length.get(&len), &mut w)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(mut r: R) -> Result<Wmp, GaddagError> {
        let version = read_u32(&mut r)?;
        if version < MIN_SUPPORTED_VERSION {
            return Err(GaddagError::UnsupportedVersion {
                found: version,
                minimum: MIN_SUPPORTED_VERSION,
            });
        }
        let board_dim = read_u32(&mut r)?;
        if board_dim != BOARD_DIM as u32 {
            return Err(GaddagError::BoardDimMismatch {
                found: board_dim,
                expected: BOARD_DIM as u32,
            });
        }
        let _max_word_lookup_bytes = read_u32(&mut r)?;
        let _max_blank_pair_bytes = read_u32(&mut r)?;

        let mut by_length = HashMap::new();
        let mut single_blank_by_length = HashMap::new();
        let mut double_blank_by_length = HashMap::new();

        for len in 2..=BOARD_DIM {
            let words = read_word_block(len, &mut r)?;
            if words.num_buckets > 0 {
                by_length.insert(len, words);
            }
            let single = read_single_blank_block(&mut r)?;
            if single.num_buckets > 0 {
                single_blank_by_length.insert(len, single);
            }
            let double = read_double_blank_block(&mut r)?;
            if double.num_buckets > 0 {
                double_blank_by_length.insert(len, double);
            }
        }

        Ok(Wmp {
            by_length,
            single_blank_by_length,
            double_blank_by_length,
        })
    }

    fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<(), GaddagError> {
        w.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn read_u32<R: Read>(r: &mut R) -> Result<u32, GaddagError> {
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Flattens CSR buckets into a prefix-sum `bucket_starts` array (length
    /// `buckets.len() + 1`) plus the total entry count.
    fn bucket_starts<T>(buckets: &[Vec<T>]) -> (Vec<u32>, u32) {
        let mut starts = Vec::with_capacity(buckets.len() + 1);
        let mut acc = 0u32;
        starts.push(acc);
        for bucket in buckets {
            acc += bucket.len() as u32;
            starts.push(acc);
        }
        (starts, acc)
    }

    fn write_word_block<W: Write>(
        table: Option<&WordsOfSameLength>,
        word_len: usize,
        w: &mut W,
    ) -> Result<(), GaddagError> {
        let empty: Vec<Vec<Entry>> = Vec::new();
        let (buckets, letters): (&[Vec<Entry>], &[MachineLetter]) = match table {
            Some(t) => (&t.buckets, &t.letters),
            None => (&empty, &[]),
        };
        let (starts, total) = bucket_starts(buckets);
        write_u32(w, buckets.len() as u32)?;
        for &s in &starts {
            write_u32(w, s)?;
        }
        write_u32(w, total)?;
        for bucket in buckets {
            for entry in bucket {
                w.write_all(&entry.quotient.to_le_bytes())?;
                match &entry.payload {
                    Payload::Inlined(inline) => {
                        w.write_all(&[1u8, inline.len() as u8])?;
                        w.write_all(inline)?;
                    }
                    Payload::Pointer(start, count) => {
                        w.write_all(&[0u8])?;
                        write_u32(w, *start / word_len as u32)?;
                        write_u32(w, *count / word_len as u32)?;
                    }
                }
            }
        }
        let num_uninlined_words = (letters.len() / word_len) as u32;
        write_u32(w, num_uninlined_words)?;
        w.write_all(letters)?;
        Ok(())
    }

    fn read_word_block<R: Read>(word_len: usize, r: &mut R) -> Result<WordsOfSameLength, GaddagError> {
        let num_buckets = read_u32(r)?;
        let mut starts = Vec::with_capacity(num_buckets as usize + 1);
        for _ in 0..=num_buckets {
            starts.push(read_u32(r)?);
        }
        let num_entries = read_u32(r)?;
        let mut flat = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            let mut quotient_buf = [0u8; 16];
            r.read_exact(&mut quotient_buf)?;
            let quotient = u128::from_le_bytes(quotient_buf);
            let mut tag = [0u8; 1];
            r.read_exact(&mut tag)?;
            let payload = if tag[0] == 1 {
                let mut len_buf = [0u8; 1];
                r.read_exact(&mut len_buf)?;
                let mut inline = vec![0u8; len_buf[0] as usize];
                r.read_exact(&mut inline)?;
                Payload::Inlined(inline)
            } else {
                let start_words = read_u32(r)?;
                let count_words = read_u32(r)?;
                Payload::Pointer(start_words * word_len as u32, count_words * word_len as u32)
            };
            flat.push(Entry { quotient, payload });
        }
        let mut buckets = vec![Vec::new(); num_buckets as usize];
        for i in 0..num_buckets as usize {
            let (lo, hi) = (starts[i] as usize, starts[i + 1] as usize);
            buckets[i] = flat[lo..hi].to_vec();
        }
        let num_uninlined_words = read_u32(r)? as usize;
        let mut letters = vec![0u8; num_uninlined_words * word_len];
        r.read_exact(&mut letters)?;
        Ok(WordsOfSameLength {
            word_len,
            num_buckets,
            buckets,
            letters,
        })
    }

    fn write_single_blank_block<W: Write>(table: Option<&SingleBlankTable>, w: &mut W) -> Result<(), GaddagError> {
        let empty: Vec<Vec<(u128, u32)>> = Vec::new();
        let buckets: &[Vec<(u128, u32)>] = table.map(|t| t.buckets.as_slice()).unwrap_or(&empty);
        let (starts, total) = bucket_starts(buckets);
        write_u32(w, buckets.len() as u32)?;
        for &s in &starts {
            write_u32(w, s)?;
        }
        write_u32(w, total)?;
        for bucket in buckets {
            for &(quotient, bitmap) in bucket {
                w.write_all(&quotient.to_le_bytes())?;
                write_u32(w, bitmap)?;
            }
        }
        Ok(())
    }

    fn read_single_blank_block<R: Read>(r: &mut R) -> Result<SingleBlankTable, GaddagError> {
        let num_buckets = read_u32(r)?;
        let mut starts = Vec::with_capacity(num_buckets as usize + 1);
        for _ in 0..=num_buckets {
            starts.push(read_u32(r)?);
        }
        let num_entries = read_u32(r)?;
        let mut flat = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            let mut quotient_buf = [0u8; 16];
            r.read_exact(&mut quotient_buf)?;
            let bitmap = read_u32(r)?;
            flat.push((u128::from_le_bytes(quotient_buf), bitmap));
        }
        let mut buckets = vec![Vec::new(); num_buckets as usize];
        for i in 0..num_buckets as usize {
            let (lo, hi) = (starts[i] as usize, starts[i + 1] as usize);
            buckets[i] = flat[lo..hi].to_vec();
        }
        Ok(SingleBlankTable { num_buckets, buckets })
    }

    fn write_double_blank_block<W: Write>(table: Option<&DoubleBlankTable>, w: &mut W) -> Result<(), GaddagError> {
        let empty_buckets: Vec<Vec<(u128, u32, u32)>> = Vec::new();
        let empty_pairs: Vec<(MachineLetter, MachineLetter)> = Vec::new();
        let (buckets, pairs): (&[Vec<(u128, u32, u32)>], &[(MachineLetter, MachineLetter)]) = match table {
            Some(t) => (&t.buckets, &t.pairs),
            None => (&empty_buckets, &empty_pairs),
        };
        let (starts, total) = bucket_starts(buckets);
        write_u32(w, buckets.len() as u32)?;
        for &s in &starts {
            write_u32(w, s)?;
        }
        write_u32(w, total)?;
        for bucket in buckets {
            for &(quotient, pairs_start, pairs_count) in bucket {
                w.write_all(&quotient.to_le_bytes())?;
                write_u32(w, pairs_start)?;
                write_u32(w, pairs_count)?;
            }
        }
        write_u32(w, pairs.len() as u32)?;
        for &(a, b) in pairs {
            w.write_all(&[a, b])?;
        }
        Ok(())
    }

    fn read_double_blank_block<R: Read>(r: &mut R) -> Result<DoubleBlankTable, GaddagError> {
        let num_buckets = read_u32(r)?;
        let mut starts = Vec::with_capacity(num_buckets as usize + 1);
        for _ in 0..=num_buckets {
            starts.push(read_u32(r)?);
        }
        let num_entries = read_u32(r)?;
        let mut flat = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            let mut quotient_buf = [0u8; 16];
            r.read_exact(&mut quotient_buf)?;
            let pairs_start = read_u32(r)?;
            let pairs_count = read_u32(r)?;
            flat.push((u128::from_le_bytes(quotient_buf), pairs_start, pairs_count));
        }
        let mut buckets = vec![Vec::new(); num_buckets as usize];
        for i in 0..num_buckets as usize {
            let (lo, hi) = (starts[i] as usize, starts[i + 1] as usize);
            buckets[i] = flat[lo..hi].to_vec();
        }
        let num_blank_pairs = read_u32(r)? as usize;
        let mut pairs = Vec::with_capacity(num_blank_pairs);
        for _ in 0..num_blank_pairs {
            let mut buf = [0u8; 2];
            r.read_exact(&mut buf)?;
            pairs.push((buf[0], buf[1]));
        }
        Ok(DoubleBlankTable {
            num_buckets,
            buckets,
            pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::LetterDistribution;

    fn mw(ld: &LetterDistribution, s: &str) -> Vec<MachineLetter> {
        s.chars().map(|c| ld.machine_letter(c).unwrap()).collect()
    }

    #[test]
    fn finds_anagram_class() {
        let ld = LetterDistribution::english();
        let words = vec![mw(&ld, "QI"), mw(&ld, "AA")];
        let wmp = Wmp::build(&words);
        let mut br = BitRack::EMPTY;
        br.add_letter(ld.machine_letter('Q').unwrap());
        br.add_letter(ld.machine_letter('I').unwrap());
        assert!(wmp.has_word(2, br));
        let found = wmp.words_of_length(2, br);
        assert_eq!(found, vec![mw(&ld, "QI")]);
    }

    #[test]
    fn missing_multiset_has_no_word() {
        let ld = LetterDistribution::english();
        let words = vec![mw(&ld, "QI")];
        let wmp = Wmp::build(&words);
        let mut br = BitRack::EMPTY;
        br.add_letter(ld.machine_letter('Z').unwrap());
        br.add_letter(ld.machine_letter('X').unwrap());
        assert!(!wmp.has_word(2, br));
    }

    #[test]
    fn single_blank_completion_found() {
        let ld = LetterDistribution::english();
        let words = vec![mw(&ld, "QI")];
        let wmp = Wmp::build(&words);
        let mut br = BitRack::EMPTY; // just "Q", blank completes as "I"
        br.add_letter(ld.machine_letter('Q').unwrap());
        let bitmap = wmp.single_blank_completions(2, br);
        let i_bit = 1u32 << ld.machine_letter('I').unwrap();
        assert_eq!(bitmap & i_bit, i_bit);
    }

    #[test]
    fn double_blank_completion_found() {
        let ld = LetterDistribution::english();
        let words = vec![mw(&ld, "QI")];
        let wmp = Wmp::build(&words);
        let pairs = wmp.double_blank_completions(2, BitRack::EMPTY);
        let q = ld.machine_letter('Q').unwrap();
        let i = ld.machine_letter('I').unwrap();
        let expected = if q < i { (q, i) } else { (i, q) };
        assert!(pairs.contains(&expected));
    }

    #[test]
    fn binary_round_trip_preserves_lookups() {
        let ld = LetterDistribution::english();
        let words = vec![mw(&ld, "QI"), mw(&ld, "AA"), mw(&ld, "ZA")];
        let wmp = Wmp::build(&words);

        let mut buf = Vec::new();
        io::write(&wmp, &mut buf).unwrap();
        let loaded = io::read(&buf[..]).unwrap();

        let mut br = BitRack::EMPTY;
        br.add_letter(ld.machine_letter('Q').unwrap());
        br.add_letter(ld.machine_letter('I').unwrap());
        assert!(loaded.has_word(2, br));
        assert_eq!(loaded.words_of_length(2, br), wmp.words_of_length(2, br));

        let mut single_br = BitRack::EMPTY;
        single_br.add_letter(ld.machine_letter('Q').unwrap());
        assert_eq!(
            loaded.single_blank_completions(2, single_br),
            wmp.single_blank_completions(2, single_br)
        );

        assert_eq!(
            loaded.double_blank_completions(2, BitRack::EMPTY),
            wmp.double_blank_completions(2, BitRack::EMPTY)
        );
    }

    #[test]
    fn rejects_mismatched_board_dim() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&io::WMP_FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&999u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            io::read(&buf[..]),
            Err(crate::error::GaddagError::BoardDimMismatch { .. })
        ));
    }
}
