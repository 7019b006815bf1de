// Pure layout policy - how many home screen items fit for a device and orientation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeviceClass {
    Pad,
    #[default]
    Phone,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LayoutContext {
    pub device: DeviceClass,
    pub orientation: Orientation,
}

impl LayoutContext {
    pub fn new(device: DeviceClass, orientation: Orientation) -> Self {
        Self { device, orientation }
    }
}

/// Per-device display limits for the Jump Back In section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutLimits {
    pub pad: usize,
    pub phone_landscape: usize,
    pub phone_portrait: usize,
    pub pad_items_in_column: usize,
    pub phone_items_in_column: usize,
}

impl Default for LayoutLimits {
    fn default() -> Self {
        Self {
            pad: 3,
            phone_landscape: 4,
            phone_portrait: 2,
            pad_items_in_column: 1,
            phone_items_in_column: 2,
        }
    }
}

impl LayoutLimits {
    /// Maximum number of items in the whole section, a group counting as one.
    pub fn max_items_to_display(&self, ctx: LayoutContext) -> usize {
        match (ctx.device, ctx.orientation) {
            (DeviceClass::Pad, _) => self.pad,
            (DeviceClass::Phone, Orientation::Landscape) => self.phone_landscape,
            (DeviceClass::Phone, Orientation::Portrait) => self.phone_portrait,
        }
    }

    pub fn max_items_in_column(&self, ctx: LayoutContext) -> usize {
        match ctx.device {
            DeviceClass::Pad => self.pad_items_in_column,
            DeviceClass::Phone => self.phone_items_in_column,
        }
    }

    /// Items stacked per column once the list is known.
    /// A phone only stacks when there is more than one item to show.
    pub fn items_in_column(&self, ctx: LayoutContext, items_to_display: usize) -> usize {
        match ctx.device {
            DeviceClass::Pad => self.pad_items_in_column,
            DeviceClass::Phone if items_to_display > 1 => self.phone_items_in_column,
            DeviceClass::Phone => 1,
        }
    }
}
