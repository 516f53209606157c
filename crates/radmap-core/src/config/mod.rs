use crate::{
    DEFAULT_BASE_RADIUS, DEFAULT_RADIUS_DECAY, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH, Error,
    Result,
};
use serde_json::{Map, Value, json};

/// JSON-object configuration with dotted-path access (`layout.baseRadius`, `surface.width`, ...).
///
/// Layers are combined with [`RadmapConfig::deep_merge`]: defaults first, then a config file, then
/// individual overrides via [`RadmapConfig::set_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct RadmapConfig(Value);

impl Default for RadmapConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl RadmapConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Every recognized key with its default value.
    pub fn defaults() -> Self {
        Self(json!({
            "layout": {
                "baseRadius": DEFAULT_BASE_RADIUS,
                "decay": DEFAULT_RADIUS_DECAY,
            },
            "surface": {
                "width": DEFAULT_SURFACE_WIDTH,
                "height": DEFAULT_SURFACE_HEIGHT,
            },
            "render": {
                "labelPaddingX": 10.0,
                "labelPaddingY": 5.0,
                "fontFamily": "\"trebuchet ms\", verdana, arial, sans-serif",
                "diagramId": "radmap",
            },
        }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(Error::invalid_config("config root must be a JSON object"));
        }
        Ok(Self(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.lookup(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Coerce a non-object root so this never panics on configs built via `from_value`.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// `(base_radius, decay)` from `layout.*`, falling back to the defaults.
    pub fn radius_params(&self) -> Result<(f64, f64)> {
        let base_radius = self
            .get_f64("layout.baseRadius")
            .unwrap_or(DEFAULT_BASE_RADIUS);
        let decay = self.get_f64("layout.decay").unwrap_or(DEFAULT_RADIUS_DECAY);
        positive_finite("layout.baseRadius", base_radius)?;
        positive_finite("layout.decay", decay)?;
        Ok((base_radius, decay))
    }

    /// `(width, height)` from `surface.*`, falling back to the defaults.
    pub fn surface_size(&self) -> Result<(f64, f64)> {
        let width = self
            .get_f64("surface.width")
            .unwrap_or(DEFAULT_SURFACE_WIDTH);
        let height = self
            .get_f64("surface.height")
            .unwrap_or(DEFAULT_SURFACE_HEIGHT);
        positive_finite("surface.width", width)?;
        positive_finite("surface.height", height)?;
        Ok((width, height))
    }
}

fn positive_finite(key: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "`{key}` must be a positive finite number, got {v}"
        )))
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
