use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;

use crate::{
    animation::chain::{AnimationChain, ChainStage, Repeat},
    foundation::error::{KinetypeError, KinetypeResult},
    render::surface::Surface,
    schedule::queue::RenderQueue,
    schedule::scheduler::{FrameScheduler, SchedulerConfig},
    text::glyphs::GlyphSource,
    text::style::{StylePatch, TextStyle},
    text::svg_font::SvgGlyphs,
    text::text_box::{SharedTextBox, TextBox},
};

/// JSON scene description: canvas, scheduler options, text boxes and the
/// animation chains that drive them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneScript {
    pub canvas: Canvas,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub font: FontSource,
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
    #[serde(default)]
    pub chains: Vec<ChainSpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// Font file, relative paths resolve against the script's directory.
    File(PathBuf),
    /// System family name.
    System(String),
}

impl Default for FontSource {
    fn default() -> Self {
        Self::System("sans-serif".to_string())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSpec {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub style: StylePatch,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainSpec {
    /// Id of the animated box.
    pub target: String,
    pub stages: Vec<ChainStage>,
    /// Extra plays of the whole chain.
    #[serde(default)]
    pub repeat: u32,
    #[serde(default)]
    pub forever: bool,
}

impl ChainSpec {
    fn repeat_mode(&self) -> Repeat {
        match (self.forever, self.repeat) {
            (true, _) => Repeat::Forever,
            (false, 0) => Repeat::Once,
            (false, n) => Repeat::Times(n),
        }
    }
}

/// A built scene, ready to be ticked.
pub struct Scene<S: Surface> {
    pub scheduler: FrameScheduler<S>,
    pub boxes: BTreeMap<String, SharedTextBox>,
}

impl<S: Surface> std::fmt::Debug for Scene<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("scheduler", &self.scheduler)
            .field("boxes", &self.boxes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SceneScript {
    pub fn from_json(json: &str) -> KinetypeResult<Self> {
        let script: Self = serde_json::from_str(json)
            .map_err(|e| KinetypeError::config(format!("invalid scene script: {e}")))?;
        script.validate()?;
        Ok(script)
    }

    #[tracing::instrument]
    pub fn from_path(path: &Path) -> KinetypeResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read scene script '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> KinetypeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KinetypeError::Other(anyhow::anyhow!("serialize scene script: {e}")))
    }

    pub fn validate(&self) -> KinetypeResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(KinetypeError::config("canvas size must be non-zero"));
        }
        if self.scheduler.target_frame_rate == 0 {
            return Err(KinetypeError::config("target frame rate must be positive"));
        }

        let mut ids = BTreeSet::new();
        for b in &self.boxes {
            if b.id.is_empty() {
                return Err(KinetypeError::config("box id must be non-empty"));
            }
            if !ids.insert(b.id.as_str()) {
                return Err(KinetypeError::config(format!("duplicate box id '{}'", b.id)));
            }
        }

        let mut animated = BTreeSet::new();
        for (i, c) in self.chains.iter().enumerate() {
            if !ids.contains(c.target.as_str()) {
                return Err(KinetypeError::config(format!(
                    "chain {i} targets unknown box '{}'",
                    c.target
                )));
            }
            if !animated.insert(c.target.as_str()) {
                return Err(KinetypeError::config(format!(
                    "box '{}' is targeted by more than one chain",
                    c.target
                )));
            }
            if c.stages.is_empty() {
                return Err(KinetypeError::config(format!("chain {i} has no stages")));
            }
            for (j, s) in c.stages.iter().enumerate() {
                if !(s.duration.is_finite() && s.duration > 0.0) {
                    return Err(KinetypeError::config(format!(
                        "chain {i} stage {j}: duration must be positive, got {}",
                        s.duration
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve the font source into a glyph provider.
    pub fn load_glyphs(&self, base_dir: &Path) -> KinetypeResult<Rc<dyn GlyphSource>> {
        let glyphs = match &self.font {
            FontSource::File(p) => {
                let path = if p.is_absolute() {
                    p.clone()
                } else {
                    base_dir.join(p)
                };
                SvgGlyphs::from_font_file(&path)?
            }
            FontSource::System(family) => SvgGlyphs::system(family)?,
        };
        tracing::info!(family = glyphs.family(), "font loaded");
        Ok(Rc::new(glyphs))
    }

    /// Build boxes and chains on `surface`.
    ///
    /// Boxes without a chain are registered as flat renderers. Each chain gets
    /// its own queue and keeps painting its box after the last stage.
    #[tracing::instrument(skip_all, fields(boxes = self.boxes.len(), chains = self.chains.len()))]
    pub fn build<S: Surface>(
        &self,
        surface: S,
        glyphs: Rc<dyn GlyphSource>,
    ) -> KinetypeResult<Scene<S>> {
        self.validate()?;
        let (w, h) = surface.size();
        if (w, h) != (self.canvas.width, self.canvas.height) {
            tracing::warn!(
                surface_width = w,
                surface_height = h,
                canvas_width = self.canvas.width,
                canvas_height = self.canvas.height,
                "surface size differs from script canvas"
            );
        }
        let mut scheduler = FrameScheduler::new(surface, self.scheduler.clone())?;

        let mut boxes = BTreeMap::new();
        for spec in &self.boxes {
            let mut style = TextStyle::default();
            spec.style.apply_to(&mut style);
            let text_box = TextBox::with_style(glyphs.clone(), spec.text.clone(), style)?;
            boxes.insert(spec.id.clone(), text_box.into_shared());
        }

        let animated: BTreeSet<&str> = self.chains.iter().map(|c| c.target.as_str()).collect();
        for spec in self.boxes.iter().filter(|b| !animated.contains(b.id.as_str())) {
            if let Some(b) = boxes.get(&spec.id) {
                scheduler.register(b.clone());
            }
        }

        for chain in &self.chains {
            let target = boxes.get(&chain.target).ok_or_else(|| {
                KinetypeError::config(format!("unknown box '{}'", chain.target))
            })?;
            let queue = RenderQueue::new();
            let mut builder = AnimationChain::new(target)
                .repeat(chain.repeat_mode())
                .hold(true);
            for stage in &chain.stages {
                builder = builder.stage(stage.clone());
            }
            builder.start(&queue)?;
            scheduler.register(queue);
        }

        Ok(Scene { scheduler, boxes })
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
