//! Native dump format (`.sti`).
//!
//! A trivial little-endian container that round-trips the full image
//! model - per-layer resolutions, roles, and metadata - without the
//! representability compromises of interchange formats. Intended for
//! intermediate caching, not for exchange with other software.
//!
//! ```text
//! "STI1"
//! u32 layer count
//!   str name | u32 width | u32 height | u32 depth | str role
//!   metadata block | f32 samples (width*height*depth)
//! metadata block                      (image level)
//!
//! str            = u32 byte length + UTF-8 bytes
//! metadata block = u32 count + (str key, u8 tag, payload) entries
//!                  tag 0: i64, tag 1: f64, tag 2: str
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use strata_core::{Image, Layer, MetaValue, Metadata, Role};
use tracing::debug;

use crate::error::{IoError, IoResult};

const MAGIC: &[u8; 4] = b"STI1";

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::None => "none",
        Role::Rgb => "rgb",
        Role::RedGreen => "redgreen",
        Role::GreenBlue => "greenblue",
        Role::RedBlue => "redblue",
        Role::Red => "red",
        Role::Green => "green",
        Role::Blue => "blue",
        Role::Alpha => "alpha",
        Role::Matte => "matte",
        Role::Luminance => "luminance",
        Role::Depth => "depth",
        Role::Normal => "normal",
        Role::Uv => "uv",
        Role::Velocity => "velocity",
        Role::Position => "position",
    }
}

fn parse_role_tag(tag: &str) -> IoResult<Role> {
    Ok(match tag {
        "none" => Role::None,
        "rgb" => Role::Rgb,
        "redgreen" => Role::RedGreen,
        "greenblue" => Role::GreenBlue,
        "redblue" => Role::RedBlue,
        "red" => Role::Red,
        "green" => Role::Green,
        "blue" => Role::Blue,
        "alpha" => Role::Alpha,
        "matte" => Role::Matte,
        "luminance" => Role::Luminance,
        "depth" => Role::Depth,
        "normal" => Role::Normal,
        "uv" => Role::Uv,
        "velocity" => Role::Velocity,
        "position" => Role::Position,
        other => return Err(IoError::decode(format!("unknown role tag {other:?}"))),
    })
}

fn write_str(writer: &mut impl Write, s: &str) -> IoResult<()> {
    writer.write_u32::<LittleEndian>(s.len() as u32)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str(reader: &mut impl Read) -> IoResult<String> {
    let len = reader.read_u32::<LittleEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| IoError::decode("string is not UTF-8"))
}

fn write_metadata(writer: &mut impl Write, metadata: &Metadata) -> IoResult<()> {
    writer.write_u32::<LittleEndian>(metadata.len() as u32)?;
    for (key, value) in metadata {
        write_str(writer, key)?;
        match value {
            MetaValue::Integer(v) => {
                writer.write_u8(0)?;
                writer.write_i64::<LittleEndian>(*v)?;
            }
            MetaValue::Real(v) => {
                writer.write_u8(1)?;
                writer.write_f64::<LittleEndian>(*v)?;
            }
            MetaValue::Text(v) => {
                writer.write_u8(2)?;
                write_str(writer, v)?;
            }
        }
    }
    Ok(())
}

fn read_metadata(reader: &mut impl Read) -> IoResult<Metadata> {
    let count = reader.read_u32::<LittleEndian>()?;
    let mut metadata = Metadata::new();
    for _ in 0..count {
        let key = read_str(reader)?;
        let value = match reader.read_u8()? {
            0 => MetaValue::Integer(reader.read_i64::<LittleEndian>()?),
            1 => MetaValue::Real(reader.read_f64::<LittleEndian>()?),
            2 => MetaValue::Text(read_str(reader)?),
            tag => return Err(IoError::decode(format!("unknown metadata tag {tag}"))),
        };
        metadata.insert(key, value);
    }
    Ok(metadata)
}

/// Reads a native dump file into a layered image.
pub fn load(path: &Path) -> IoResult<Image> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(IoError::decode("bad magic; not a native dump file"));
    }

    let count = reader.read_u32::<LittleEndian>()?;
    let mut image = Image::new();
    for _ in 0..count {
        let name = read_str(&mut reader)?;
        let width = reader.read_u32::<LittleEndian>()? as usize;
        let height = reader.read_u32::<LittleEndian>()? as usize;
        let depth = reader.read_u32::<LittleEndian>()? as usize;
        let role = parse_role_tag(&read_str(&mut reader)?)?;
        let layer_metadata = read_metadata(&mut reader)?;
        let mut data = vec![0.0f32; width * height * depth];
        reader.read_f32_into::<LittleEndian>(&mut data)?;
        let layer = Layer::new(width, height, depth, data, role)?.with_metadata(layer_metadata);
        image = image.with_layer(name, layer);
    }
    let metadata = read_metadata(&mut reader)?;
    debug!(path = %path.display(), layers = image.len(), "native load");
    Ok(image.with_metadata(metadata))
}

/// Writes a layered image to a native dump file.
pub fn save(image: &Image, path: &Path) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(image.len() as u32)?;
    for (name, layer) in image.iter() {
        write_str(&mut writer, name)?;
        let (width, height, depth) = layer.shape();
        writer.write_u32::<LittleEndian>(width as u32)?;
        writer.write_u32::<LittleEndian>(height as u32)?;
        writer.write_u32::<LittleEndian>(depth as u32)?;
        write_str(&mut writer, role_tag(layer.role()))?;
        write_metadata(&mut writer, layer.metadata())?;
        for &sample in layer.data() {
            writer.write_f32::<LittleEndian>(sample)?;
        }
    }
    write_metadata(&mut writer, image.metadata())?;
    debug!(path = %path.display(), layers = image.len(), "native save");
    Ok(())
}
