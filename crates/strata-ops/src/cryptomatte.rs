//! Cryptomatte matte extraction.
//!
//! Follows the Cryptomatte 1.2 specification: object names are hashed with
//! MurmurHash3-32 to float-typed IDs, stored alongside per-pixel coverage
//! in rank layer pairs, and reassembled here into ordinary mattes.

use regex::Regex;
use strata_core::{Image, Layer, Role};
use tracing::debug;

use crate::error::{OpsError, OpsResult};

lazy_static::lazy_static! {
    static ref MANIFEST_KEY: Regex =
        Regex::new(r"^cryptomatte/(.{7})/name$").unwrap();
}

/// Parameters for [`decode`].
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Emit a clown matte: a distinct color per matte instead of coverage.
    pub clown: bool,
    /// Output layer name.
    pub layer: String,
    /// Object names to extract; the result is their union. Empty yields an
    /// all-zero matte.
    pub mattes: Vec<String>,
    /// Which cryptomatte to read, for images carrying more than one.
    pub cryptomatte: Option<String>,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            clown: false,
            layer: "M".into(),
            mattes: Vec::new(),
            cryptomatte: None,
        }
    }
}

/// MurmurHash3 32-bit, x86 variant.
fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;
    let mut h = seed;
    let mut chunks = data.chunks_exact(4);
    for chunk in chunks.by_ref() {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
            .wrapping_mul(C1)
            .rotate_left(15)
            .wrapping_mul(C2);
        h = (h ^ k).rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &b) in tail.iter().enumerate() {
            k |= (b as u32) << (8 * i);
        }
        h ^= k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2);
    }
    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Hashes an object name to its float-typed Cryptomatte ID.
///
/// Per the specification, hashes whose float exponent would be all zeros
/// or all ones get one exponent bit flipped so the ID is never an inf,
/// NaN, or denormal.
pub fn name_to_id(name: &str) -> f32 {
    let mut hash = murmur3_32(name.as_bytes(), 0);
    let exp = (hash >> 23) & 255;
    if exp == 0 || exp == 255 {
        hash ^= 1 << 23;
    }
    f32::from_bits(hash)
}

/// Deterministic preview color for one matte, seeded from its ID bits.
fn matte_color(seed: u32) -> [f32; 3] {
    let mut state = seed as u64;
    std::array::from_fn(|_| {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 40) as f32 / (1u64 << 24) as f32
    })
}

/// Finds and orders the rank layers of one cryptomatte.
///
/// Rank layers are named `<cryptomatte><two digits>.<channel>`; they are
/// ordered by rank then channel (r, g, b, a) so consecutive pairs hold
/// (id, coverage).
fn rank_layers(image: &Image, cryptomatte: &str) -> OpsResult<Vec<String>> {
    let pattern = Regex::new(&format!(
        r"(?i)^{}\d{{2}}\.(red|green|blue|alpha|r|g|b|a)$",
        regex::escape(cryptomatte)
    ))
    .map_err(|e| OpsError::invalid_parameter(format!("bad cryptomatte name: {e}")))?;

    let channel_rank = |name: &str| -> u32 {
        match name
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "red" | "r" => 0,
            "green" | "g" => 1,
            "blue" | "b" => 2,
            _ => 3,
        }
    };

    let mut names: Vec<String> = image
        .layer_names()
        .into_iter()
        .filter(|name| pattern.is_match(name))
        .map(String::from)
        .collect();
    names.sort_by_key(|name| {
        let prefix = name.rsplit_once('.').map(|(p, _)| p.to_string()).unwrap_or_default();
        (prefix, channel_rank(name))
    });
    Ok(names)
}

/// Extracts mattes from an image containing Cryptomatte data.
///
/// The cryptomatte to read is located through `cryptomatte/<id>/name`
/// metadata keys; when the image carries several, `params.cryptomatte`
/// must pick one. Requested names absent from the encoding simply
/// contribute nothing - the output for them is zero coverage, not an
/// error, and hash collisions between names are not detected.
///
/// Non-clown output is a single-channel matte layer accumulating coverage
/// across all ranks. Clown output is an RGB layer coloring each matte's
/// first-rank selection with a deterministic pseudo-random color.
pub fn decode(image: &Image, params: &DecodeParams) -> OpsResult<Image> {
    let mut names: Vec<String> = image
        .metadata()
        .iter()
        .filter(|(key, _)| MANIFEST_KEY.is_match(key))
        .filter_map(|(_, value)| value.as_text().map(String::from))
        .collect();
    if let Some(wanted) = &params.cryptomatte {
        names.retain(|name| name == wanted);
    }
    if names.is_empty() {
        return Err(OpsError::invalid_parameter(
            "no matching cryptomattes were found",
        ));
    }
    if names.len() > 1 {
        return Err(OpsError::invalid_parameter(
            "a specific cryptomatte must be chosen",
        ));
    }
    let cryptomatte = &names[0];

    let layers = rank_layers(image, cryptomatte)?;
    if layers.is_empty() {
        return Err(OpsError::invalid_parameter(format!(
            "no rank layers found for cryptomatte {cryptomatte:?}"
        )));
    }
    debug!(
        cryptomatte = cryptomatte.as_str(),
        ranks = layers.len() / 2,
        mattes = params.mattes.len(),
        clown = params.clown,
        "cryptomatte decode"
    );

    let first = image.layer(&layers[0])?;
    let (width, height, _) = first.shape();
    for name in &layers {
        let layer = image.layer(name)?;
        if layer.depth() != 1 {
            return Err(OpsError::shape_mismatch(format!(
                "rank layer {name:?} must have one channel"
            )));
        }
        if layer.res() != (width, height) {
            return Err(OpsError::shape_mismatch(format!(
                "rank layer {name:?} resolution differs from {:?}",
                (width, height)
            )));
        }
    }

    let ids: Vec<f32> = params.mattes.iter().map(|name| name_to_id(name)).collect();

    if params.clown {
        // Clown mattes only consider the first rank.
        let rank_ids = image.layer(&layers[0])?.data();
        let mut data = vec![0.0f32; width * height * 3];
        for (matte_id, matte) in ids.iter().zip(&params.mattes) {
            let color = matte_color(matte_id.to_bits());
            debug!(matte = matte.as_str(), ?color, "clown color");
            for (px, &id) in rank_ids.iter().enumerate() {
                if id == *matte_id {
                    data[px * 3..px * 3 + 3].copy_from_slice(&color);
                }
            }
        }
        let layer = Layer::new(width, height, 3, data, Role::Rgb)?;
        return Ok(Image::new().with_layer(&params.layer, layer));
    }

    let mut data = vec![0.0f32; width * height];
    for pair in layers.chunks_exact(2) {
        let rank_ids = image.layer(&pair[0])?.data();
        let rank_coverage = image.layer(&pair[1])?.data();
        for matte_id in &ids {
            for px in 0..data.len() {
                if rank_ids[px] == *matte_id {
                    data[px] += rank_coverage[px];
                }
            }
        }
    }
    let layer = Layer::new(width, height, 1, data, Role::Matte)?;
    Ok(Image::new().with_layer(&params.layer, layer))
}
