//! Overlay rendering and the display hand-off

use crate::models::{Detection, DetectionSet};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use visionhelper_core::LocaleLabels;

/// Box colors, indexed by class id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoxColor {
    Cyan,
    Red,
    Yellow,
    Green,
    Magenta,
    Blue,
    /// Any id outside the known taxonomy
    White,
}

const CLASS_COLORS: [BoxColor; 6] = [
    BoxColor::Cyan,
    BoxColor::Red,
    BoxColor::Yellow,
    BoxColor::Green,
    BoxColor::Magenta,
    BoxColor::Blue,
];

impl BoxColor {
    pub fn for_class(class_id: u32) -> Self {
        CLASS_COLORS
            .get(class_id as usize)
            .copied()
            .unwrap_or(BoxColor::White)
    }

    /// 8-bit RGB triple
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            BoxColor::Cyan => (0, 255, 255),
            BoxColor::Red => (255, 0, 0),
            BoxColor::Yellow => (255, 255, 0),
            BoxColor::Green => (0, 255, 0),
            BoxColor::Magenta => (255, 0, 255),
            BoxColor::Blue => (0, 0, 255),
            BoxColor::White => (255, 255, 255),
        }
    }
}

/// Presentation constants for drawing an overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub stroke_width: f32,
    pub box_corner_radius: f32,
    pub caption_corner_radius: f32,
    pub text_size: f32,
    pub caption_padding: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: 6.0,
            box_corner_radius: 16.0,
            caption_corner_radius: 8.0,
            text_size: 36.0,
            caption_padding: 8.0,
        }
    }
}

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// One drawable box with its caption. The caption is anchored at the
/// box's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayElement {
    pub class_id: u32,
    pub rect: PixelRect,
    pub caption: String,
    pub color: BoxColor,
}

/// Renderable result for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub width: u32,
    pub height: u32,
    pub elements: Vec<OverlayElement>,
    pub style: OverlayStyle,
}

impl Overlay {
    /// Zero-size overlay with nothing to draw
    pub fn empty(style: OverlayStyle) -> Self {
        Self {
            width: 0,
            height: 0,
            elements: Vec::new(),
            style,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Maps detections to a localized, colored overlay
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// One element per detection, in detector order
    pub fn render(&self, detections: &DetectionSet, viewport: Option<Viewport>, labels: Option<&LocaleLabels>) -> Overlay {
        let viewport = match viewport {
            Some(viewport) if !viewport.is_empty() => viewport,
            _ => return Overlay::empty(self.style.clone()),
        };

        let elements = detections
            .iter()
            .map(|detection| self.element(detection, viewport, labels))
            .collect();

        Overlay {
            width: viewport.width,
            height: viewport.height,
            elements,
            style: self.style.clone(),
        }
    }

    fn element(&self, detection: &Detection, viewport: Viewport, labels: Option<&LocaleLabels>) -> OverlayElement {
        let w = viewport.width as f32;
        let h = viewport.height as f32;
        let label = labels
            .and_then(|labels| labels.get(&detection.class_id))
            .map(String::as_str)
            .unwrap_or(&detection.class_name);

        OverlayElement {
            class_id: detection.class_id,
            rect: PixelRect {
                left: detection.x1 * w,
                top: detection.y1 * h,
                right: detection.x2 * w,
                bottom: detection.y2 * h,
            },
            caption: format!("{} {:.2}", label, detection.confidence),
            color: BoxColor::for_class(detection.class_id),
        }
    }
}

/// Display collaborator. Presenting must not block the caller.
pub trait OverlaySink: Send + Sync {
    fn present(&self, overlay: Overlay);
}

/// Sink that publishes the most recent overlay on a watch channel.
/// A slow display only ever sees the latest one.
pub struct WatchOverlaySink {
    sender: watch::Sender<Arc<Overlay>>,
}

impl WatchOverlaySink {
    pub fn new() -> (Self, watch::Receiver<Arc<Overlay>>) {
        let (sender, receiver) = watch::channel(Arc::new(Overlay::empty(OverlayStyle::default())));
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Overlay>> {
        self.sender.subscribe()
    }
}

impl OverlaySink for WatchOverlaySink {
    fn present(&self, overlay: Overlay) {
        self.sender.send_replace(Arc::new(overlay));
    }
}
