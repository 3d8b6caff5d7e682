//! Named-input operator dispatch.
//!
//! An external scheduler drives this library by name: it builds an
//! [`Inputs`] bag, looks an operator up in a [`Registry`], and gets an
//! image back. The registry is plain data owned by the caller - there is
//! no process-wide operator table.
//!
//! Parameters arrive as [`Value`]s, a tagged union covering the handful of
//! shapes schedulers pass around: numbers, strings, dimension expressions,
//! images. Accessors coerce where the meaning is unambiguous (a bare
//! number is an absolute pixel length) and fail loudly otherwise.

use std::collections::BTreeMap;

use strata_core::{Image, Role};
use strata_units::{Couple, Length, Unit};

use crate::error::{OpsError, OpsResult};
use crate::text::TextParams;
use crate::transform::OffsetMode;
use crate::{blur, color, composite, cryptomatte, fill, merge, palette, text, transform};

/// A dynamically-typed operator parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A flag.
    Boolean(bool),
    /// An integral number.
    Integer(i64),
    /// A floating-point number.
    Real(f64),
    /// A string.
    Text(String),
    /// A dimension expression.
    Length(Length),
    /// A two-axis dimension expression.
    Couple(Couple),
    /// A list of numbers.
    Reals(Vec<f64>),
    /// A list of strings.
    Texts(Vec<String>),
    /// A string-to-string mapping.
    Table(BTreeMap<String, String>),
    /// A whole image.
    Image(Image),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Length(_) => "length",
            Value::Couple(_) => "couple",
            Value::Reals(_) => "reals",
            Value::Texts(_) => "texts",
            Value::Table(_) => "table",
            Value::Image(_) => "image",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
impl From<Length> for Value {
    fn from(v: Length) -> Self {
        Value::Length(v)
    }
}
impl From<Couple> for Value {
    fn from(v: Couple) -> Self {
        Value::Couple(v)
    }
}
impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Reals(v)
    }
}
impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Texts(v)
    }
}
impl From<BTreeMap<String, String>> for Value {
    fn from(v: BTreeMap<String, String>) -> Self {
        Value::Table(v)
    }
}
impl From<Image> for Value {
    fn from(v: Image) -> Self {
        Value::Image(v)
    }
}

fn wrong_kind(name: &str, expected: &str, found: &Value) -> OpsError {
    OpsError::invalid_parameter(format!(
        "input {name:?} expects {expected}, got {}",
        found.kind()
    ))
}

/// Named operator inputs.
///
/// A name may carry several values; positional accessors use the first,
/// while [`Inputs::images`] collects every image in name order (which is
/// how variadic operators like merge receive their operands).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    entries: BTreeMap<String, Vec<Value>>,
}

impl Inputs {
    /// Creates an empty input bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Appends a value under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.entry(name.into()).or_default().push(value.into());
    }

    fn first(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).and_then(|values| values.first())
    }

    /// Every image value, in input-name order.
    pub fn images(&self) -> Vec<&Image> {
        self.entries
            .values()
            .flatten()
            .filter_map(|value| match value {
                Value::Image(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    /// Fetches a required image input.
    pub fn require_image(&self, name: &str) -> OpsResult<&Image> {
        self.optional_image(name)?
            .ok_or_else(|| OpsError::invalid_parameter(format!("missing required input {name:?}")))
    }

    /// Fetches an optional image input.
    pub fn optional_image(&self, name: &str) -> OpsResult<Option<&Image>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Image(image)) => Ok(Some(image)),
            Some(other) => Err(wrong_kind(name, "an image", other)),
        }
    }

    /// Fetches an optional string input.
    pub fn optional_text(&self, name: &str) -> OpsResult<Option<&str>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text)),
            Some(other) => Err(wrong_kind(name, "text", other)),
        }
    }

    /// Fetches an optional number, accepting integers.
    pub fn optional_real(&self, name: &str) -> OpsResult<Option<f64>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Real(v)) => Ok(Some(*v)),
            Some(Value::Integer(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(wrong_kind(name, "a number", other)),
        }
    }

    /// Fetches an optional integer.
    pub fn optional_integer(&self, name: &str) -> OpsResult<Option<i64>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(wrong_kind(name, "an integer", other)),
        }
    }

    /// Fetches an optional flag.
    pub fn optional_boolean(&self, name: &str) -> OpsResult<Option<bool>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Boolean(v)) => Ok(Some(*v)),
            Some(other) => Err(wrong_kind(name, "a boolean", other)),
        }
    }

    /// Fetches an optional dimension expression.
    ///
    /// Bare numbers coerce to absolute pixels; strings are parsed.
    pub fn optional_length(&self, name: &str) -> OpsResult<Option<Length>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Length(v)) => Ok(Some(*v)),
            Some(Value::Real(v)) => Ok(Some(Length::px(*v))),
            Some(Value::Integer(v)) => Ok(Some(Length::px(*v as f64))),
            Some(Value::Text(text)) => Ok(Some(text.parse()?)),
            Some(other) => Err(wrong_kind(name, "a dimension expression", other)),
        }
    }

    /// Fetches an optional two-axis dimension expression.
    ///
    /// Accepts a couple, a pair of numbers, a pair of expression strings,
    /// or a single number applied to both axes.
    pub fn optional_couple(&self, name: &str) -> OpsResult<Option<Couple>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Couple(v)) => Ok(Some(*v)),
            Some(Value::Real(v)) => Ok(Some(Couple::new(*v, *v))),
            Some(Value::Integer(v)) => Ok(Some(Couple::new(*v as f64, *v as f64))),
            Some(Value::Reals(v)) if v.len() == 2 => Ok(Some(Couple::new(v[0], v[1]))),
            Some(Value::Texts(v)) if v.len() == 2 => Ok(Some(Couple::parse(&v[0], &v[1])?)),
            Some(other) => Err(wrong_kind(name, "a two-axis expression", other)),
        }
    }

    /// Fetches an optional list of numbers; a lone number becomes a
    /// one-element list.
    pub fn optional_reals(&self, name: &str) -> OpsResult<Option<Vec<f64>>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Reals(v)) => Ok(Some(v.clone())),
            Some(Value::Real(v)) => Ok(Some(vec![*v])),
            Some(Value::Integer(v)) => Ok(Some(vec![*v as f64])),
            Some(other) => Err(wrong_kind(name, "a list of numbers", other)),
        }
    }

    /// Fetches an optional list of strings; a lone string becomes a
    /// one-element list.
    pub fn optional_texts(&self, name: &str) -> OpsResult<Option<Vec<String>>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Texts(v)) => Ok(Some(v.clone())),
            Some(Value::Text(v)) => Ok(Some(vec![v.clone()])),
            Some(other) => Err(wrong_kind(name, "a list of strings", other)),
        }
    }

    /// Fetches an optional string mapping.
    pub fn optional_table(&self, name: &str) -> OpsResult<Option<&BTreeMap<String, String>>> {
        match self.first(name) {
            None => Ok(None),
            Some(Value::Table(v)) => Ok(Some(v)),
            Some(other) => Err(wrong_kind(name, "a table", other)),
        }
    }
}

/// An operator callable through a [`Registry`].
pub type Operator = fn(&Inputs) -> OpsResult<Image>;

/// A caller-owned name-to-operator table.
///
/// Schedulers construct a registry (usually via [`Registry::with_builtins`]),
/// optionally add their own operators, and dispatch by name. Cloning is
/// cheap; registries hold only function pointers.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    operators: BTreeMap<String, Operator>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in operator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("colormap", colormap_op);
        registry.register("composite", composite_op);
        registry.register("cryptomatte", cryptomatte_op);
        registry.register("delete", delete_op);
        registry.register("dot", dot_op);
        registry.register("fill", fill_op);
        registry.register("gaussian", gaussian_op);
        registry.register("merge", merge_op);
        registry.register("offset", offset_op);
        registry.register("remap", remap_op);
        registry.register("rename", rename_op);
        registry.register("resize", resize_op);
        registry.register("rgb2gray", rgb2gray_op);
        registry.register("scale", scale_op);
        registry.register("text", text_op);
        registry
    }

    /// Adds or replaces an operator.
    pub fn register(&mut self, name: impl Into<String>, operator: Operator) {
        self.operators.insert(name.into(), operator);
    }

    /// Looks up an operator by name.
    pub fn get(&self, name: &str) -> Option<Operator> {
        self.operators.get(name).copied()
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.operators.keys().map(String::as_str).collect()
    }

    /// Invokes an operator by name.
    pub fn call(&self, name: &str, inputs: &Inputs) -> OpsResult<Image> {
        let operator = self
            .get(name)
            .ok_or_else(|| strata_core::Error::not_found(name))?;
        operator(inputs)
    }
}

fn parse_role(name: &str) -> OpsResult<Role> {
    Ok(match name.to_lowercase().as_str() {
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
        other => return Err(OpsError::invalid_parameter(format!("unknown role {other:?}"))),
    })
}

/// Requires a couple to be in absolute pixels and rounds it to a
/// resolution. Used where there is no target image to resolve against.
fn absolute_res(couple: &Couple, name: &str) -> OpsResult<(usize, usize)> {
    for axis in [couple.x, couple.y] {
        if axis.unit() != Unit::Px {
            return Err(OpsError::invalid_parameter(format!(
                "{name} must be absolute pixels, got {axis}"
            )));
        }
    }
    let (w, h) = (couple.x.magnitude().round(), couple.y.magnitude().round());
    if w < 1.0 || h < 1.0 {
        return Err(OpsError::invalid_parameter(format!(
            "{name} must be at least 1x1, got {w}x{h}"
        )));
    }
    Ok((w as usize, h as usize))
}

fn fill_op(inputs: &Inputs) -> OpsResult<Image> {
    let layer = inputs.optional_text("layer")?.unwrap_or("C").to_string();
    let res = inputs
        .optional_couple("res")?
        .unwrap_or_else(|| Couple::new(256.0, 256.0));
    let res = absolute_res(&res, "fill resolution")?;
    let values: Vec<f32> = inputs
        .optional_reals("values")?
        .unwrap_or_else(|| vec![1.0, 1.0, 1.0])
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let role = parse_role(inputs.optional_text("role")?.unwrap_or("rgb"))?;
    fill::fill(&layer, res, &values, role)
}

fn merge_op(inputs: &Inputs) -> OpsResult<Image> {
    Ok(merge::merge(&inputs.images()))
}

fn delete_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    merge::delete(image, layers)
}

fn rename_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let empty = BTreeMap::new();
    let changes = inputs.optional_table("changes")?.unwrap_or(&empty);
    Ok(merge::rename(image, changes))
}

fn remap_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let empty = BTreeMap::new();
    let table = inputs.optional_table("mapping")?.unwrap_or(&empty);

    // Each table value is a whitespace-separated selection list: a bare
    // token picks a whole layer, "layer:N" picks channel N (the colon
    // separator leaves dotted layer names like "C.R" usable), and a
    // "role=NAME" token tags the output.
    let mut mapping = BTreeMap::new();
    for (name, spec) in table {
        let mut selections = Vec::new();
        let mut role = Role::None;
        for token in spec.split_whitespace() {
            if let Some(tag) = token.strip_prefix("role=") {
                role = parse_role(tag)?;
            } else if let Some((layer, channel)) = token.rsplit_once(':') {
                let channel = channel.parse().map_err(|_| {
                    OpsError::invalid_parameter(format!("bad channel index in {token:?}"))
                })?;
                selections.push(merge::Selection::Channel(layer.to_string(), channel));
            } else {
                selections.push(merge::Selection::Layer(token.to_string()));
            }
        }
        mapping.insert(name.clone(), (selections, role));
    }
    merge::remap(image, &mapping)
}

fn offset_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    let amount = inputs.optional_couple("offset")?.unwrap_or_default();
    let mode = match inputs.optional_text("mode")?.unwrap_or("wrap") {
        "wrap" => OffsetMode::Wrap,
        "zero" => OffsetMode::Zero,
        other => {
            return Err(OpsError::invalid_parameter(format!(
                "unknown offset mode {other:?}"
            )));
        }
    };
    transform::offset(image, layers, &amount, mode)
}

fn resize_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    let res = inputs.optional_couple("res")?.unwrap_or_else(|| {
        Couple::new(Length::new(1.0, Unit::Vw), Length::new(1.0, Unit::Vh))
    });
    let order = inputs.optional_integer("order")?.unwrap_or(3);
    transform::resize(image, layers, &res, order)
}

fn scale_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    let factors = inputs
        .optional_reals("factors")?
        .unwrap_or_else(|| vec![1.0, 1.0]);
    let &[fx, fy] = factors.as_slice() else {
        return Err(OpsError::invalid_parameter(
            "scale factors must hold exactly two numbers",
        ));
    };
    let order = inputs.optional_integer("order")?.unwrap_or(3);
    transform::scale(image, layers, (fx, fy), order)
}

fn gaussian_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    let radius = inputs
        .optional_couple("radius")?
        .unwrap_or_else(|| Couple::new(5.0, 5.0));
    blur::gaussian(image, layers, &radius)
}

fn dot_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    let weights: Vec<f32> = inputs
        .optional_reals("weights")?
        .ok_or_else(|| OpsError::invalid_parameter("missing required input \"weights\""))?
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let role = parse_role(inputs.optional_text("role")?.unwrap_or("none"))?;
    color::dot(image, layers, &[weights], role)
}

fn rgb2gray_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layers = inputs.optional_text("layers")?.unwrap_or("*");
    color::rgb2gray(image, layers)
}

fn colormap_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let layer = inputs.optional_text("layer")?;
    let name = inputs.optional_text("palette")?.unwrap_or("blackbody");
    let mut pal = palette::Palette::named(name)
        .ok_or_else(|| OpsError::invalid_parameter(format!("unknown palette {name:?}")))?;
    if inputs.optional_boolean("reverse")?.unwrap_or(false) {
        pal = pal.reversed();
    }
    let range = match inputs.optional_reals("range")? {
        None => None,
        Some(bounds) => {
            let &[lo, hi] = bounds.as_slice() else {
                return Err(OpsError::invalid_parameter(
                    "range must hold exactly two numbers",
                ));
            };
            Some((lo as f32, hi as f32))
        }
    };
    color::colormap(image, layer, &pal, range)
}

fn text_op(inputs: &Inputs) -> OpsResult<Image> {
    let defaults = TextParams::default();
    let res = match inputs.optional_couple("res")? {
        Some(couple) => absolute_res(&couple, "text resolution")?,
        None => defaults.res,
    };
    let anchor = match inputs.optional_text("anchor")? {
        Some(code) => code.parse()?,
        None => defaults.anchor,
    };
    let params = TextParams {
        layer: inputs
            .optional_text("layer")?
            .unwrap_or(&defaults.layer)
            .to_string(),
        anchor,
        font: inputs
            .optional_text("font")?
            .unwrap_or(&defaults.font)
            .to_string(),
        fontsize: inputs.optional_length("fontsize")?.unwrap_or(defaults.fontsize),
        position: inputs
            .optional_couple("position")?
            .unwrap_or(defaults.position),
        res,
        text: inputs.optional_text("string")?.unwrap_or("").to_string(),
    };
    text::text(&params)
}

fn composite_op(inputs: &Inputs) -> OpsResult<Image> {
    let foreground = inputs.require_image("foreground")?;
    let background = inputs.require_image("background")?;
    let mask = inputs.optional_image("mask")?;
    let defaults = composite::CompositeParams::default();
    let scale = match inputs.optional_reals("scale")? {
        None => defaults.scale,
        Some(factors) => {
            let &[fx, fy] = factors.as_slice() else {
                return Err(OpsError::invalid_parameter(
                    "scale factors must hold exactly two numbers",
                ));
            };
            (fx, fy)
        }
    };
    let params = composite::CompositeParams {
        bglayer: inputs
            .optional_text("bglayer")?
            .unwrap_or(&defaults.bglayer)
            .to_string(),
        fglayer: inputs
            .optional_text("fglayer")?
            .unwrap_or(&defaults.fglayer)
            .to_string(),
        layer: inputs.optional_text("layer")?.map(String::from),
        masklayer: inputs
            .optional_text("masklayer")?
            .unwrap_or(&defaults.masklayer)
            .to_string(),
        order: inputs.optional_integer("order")?.unwrap_or(defaults.order),
        orientation: inputs
            .optional_real("orientation")?
            .unwrap_or(defaults.orientation),
        pivot: inputs.optional_couple("pivot")?.unwrap_or(defaults.pivot),
        position: inputs
            .optional_couple("position")?
            .unwrap_or(defaults.position),
        scale,
    };
    composite::composite(foreground, background, mask, &params)
}

fn cryptomatte_op(inputs: &Inputs) -> OpsResult<Image> {
    let image = inputs.require_image("image")?;
    let params = cryptomatte::DecodeParams {
        clown: inputs.optional_boolean("clown")?.unwrap_or(false),
        layer: inputs.optional_text("layer")?.unwrap_or("M").to_string(),
        mattes: inputs.optional_texts("mattes")?.unwrap_or_default(),
        cryptomatte: inputs.optional_text("cryptomatte")?.map(String::from),
    };
    cryptomatte::decode(image, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatch() {
        let registry = Registry::with_builtins();
        assert!(registry.get("fill").is_some());
        assert!(registry.get("sharpen").is_none());
        assert!(registry.names().contains(&"cryptomatte"));
    }

    #[test]
    fn test_call_unknown_operator() {
        let registry = Registry::with_builtins();
        let err = registry.call("sharpen", &Inputs::new()).unwrap_err();
        assert!(matches!(err, OpsError::Core(strata_core::Error::NotFound { .. })));
    }

    #[test]
    fn test_fill_defaults() {
        let registry = Registry::with_builtins();
        let image = registry.call("fill", &Inputs::new()).unwrap();
        let layer = image.layer("C").unwrap();
        assert_eq!(layer.shape(), (256, 256, 3));
        assert_eq!(layer.role(), Role::Rgb);
        assert_eq!(layer.sample(0, 0, 0), 1.0);
    }

    #[test]
    fn test_fill_rejects_relative_resolution() {
        let registry = Registry::with_builtins();
        let inputs = Inputs::new().with("res", Couple::parse("0.5w", "64px").unwrap());
        assert!(registry.call("fill", &inputs).is_err());
    }

    #[test]
    fn test_merge_collects_images_in_name_order() {
        let registry = Registry::with_builtins();
        let a = registry
            .call("fill", &Inputs::new().with("layer", "A"))
            .unwrap();
        let b = registry
            .call("fill", &Inputs::new().with("layer", "B"))
            .unwrap();
        let inputs = Inputs::new().with("first", a).with("second", b);
        let merged = registry.call("merge", &inputs).unwrap();
        assert_eq!(merged.layer_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_missing_required_image() {
        let registry = Registry::with_builtins();
        let err = registry.call("delete", &Inputs::new()).unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }

    #[test]
    fn test_kind_mismatch_reported() {
        let inputs = Inputs::new().with("layers", 3.0);
        let err = inputs.optional_text("layers").unwrap_err();
        assert!(err.to_string().contains("expects text"));
    }

    #[test]
    fn test_couple_coercions() {
        let inputs = Inputs::new()
            .with("a", 5.0)
            .with("b", vec![1.0, 2.0])
            .with("c", vec!["0.5w".to_string(), "16px".to_string()]);
        assert_eq!(
            inputs.optional_couple("a").unwrap(),
            Some(Couple::new(5.0, 5.0))
        );
        assert_eq!(
            inputs.optional_couple("b").unwrap(),
            Some(Couple::new(1.0, 2.0))
        );
        let c = inputs.optional_couple("c").unwrap().unwrap();
        assert_eq!(c.resolve(100.0, 100.0), (50.0, 16.0));
    }

    #[test]
    fn test_custom_operator() {
        fn checker(_: &Inputs) -> OpsResult<Image> {
            fill::fill("check", (2, 2), &[1.0], Role::Matte)
        }
        let mut registry = Registry::new();
        registry.register("checker", checker);
        let image = registry.call("checker", &Inputs::new()).unwrap();
        assert!(image.layer("check").is_ok());
    }

    #[test]
    fn test_remap_via_table() {
        let registry = Registry::with_builtins();
        let filled = registry.call("fill", &Inputs::new()).unwrap();
        let mapping = BTreeMap::from([(
            "red".to_string(),
            "C:0 role=luminance".to_string(),
        )]);
        let inputs = Inputs::new().with("image", filled).with("mapping", mapping);
        let remapped = registry.call("remap", &inputs).unwrap();
        let layer = remapped.layer("red").unwrap();
        assert_eq!(layer.depth(), 1);
        assert_eq!(layer.role(), Role::Luminance);
        assert_eq!(layer.sample(0, 0, 0), 1.0);
    }

    #[test]
    fn test_rgb2gray_via_registry() {
        let registry = Registry::with_builtins();
        let filled = registry.call("fill", &Inputs::new()).unwrap();
        let gray = registry
            .call("rgb2gray", &Inputs::new().with("image", filled))
            .unwrap();
        assert_eq!(gray.layer("C").unwrap().depth(), 1);
    }
}
