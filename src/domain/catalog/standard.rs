//! Built-in part table.

use super::CatalogError;
use crate::domain::part::{PartCategory, PartDescriptor, PartId};

type Row = (
    &'static str,
    &'static str,
    PartCategory,
    &'static str,
    Option<&'static str>,
    &'static [&'static str],
);

/// Parts every harness ships with.
const HARNESS_CONTENTS: &[&str] = &[
    "harness_box",
    "comma_power_v2",
    "rj45_cable_7ft",
    "long_obdc_cable",
    "usbc_coupler",
];

#[rustfmt::skip]
const ROWS: &[Row] = &[
    // Harnesses
    ("honda_nidec", "Honda Nidec connector", PartCategory::Harness, "For Honda vehicles with Nidec ADAS", Some("https://comma.ai/shop/harnesses/honda-nidec"), HARNESS_CONTENTS),
    ("honda_bosch_a", "Honda Bosch A connector", PartCategory::Harness, "For Honda vehicles with Bosch ADAS (Type A)", Some("https://comma.ai/shop/harnesses/honda-bosch-a"), HARNESS_CONTENTS),
    ("honda_bosch_b", "Honda Bosch B connector", PartCategory::Harness, "For Honda vehicles with Bosch ADAS (Type B)", Some("https://comma.ai/shop/harnesses/honda-bosch-b"), HARNESS_CONTENTS),
    ("honda_bosch_c", "Honda Bosch C connector", PartCategory::Harness, "For Honda vehicles with Bosch ADAS (Type C)", Some("https://comma.ai/shop/harnesses/honda-bosch-c"), HARNESS_CONTENTS),
    ("toyota_a", "Toyota A connector", PartCategory::Harness, "For Toyota vehicles (Type A)", Some("https://comma.ai/shop/harnesses/toyota-a"), HARNESS_CONTENTS),
    ("toyota_b", "Toyota B connector", PartCategory::Harness, "For Toyota vehicles (Type B)", Some("https://comma.ai/shop/harnesses/toyota-b"), HARNESS_CONTENTS),
    ("subaru_a", "Subaru A connector", PartCategory::Harness, "For pre-2020 models with torque-based LKAS", Some("https://comma.ai/shop/harnesses/subaru-a"), HARNESS_CONTENTS),
    ("subaru_b", "Subaru B connector", PartCategory::Harness, "For 2020-22 Outback/Legacy and 2020 Crosstrek Hybrid", Some("https://comma.ai/shop/harnesses/subaru-b"), HARNESS_CONTENTS),
    ("subaru_c", "Subaru C connector", PartCategory::Harness, "For 2022-24 Forester", Some("https://comma.ai/shop/harnesses/subaru-c"), HARNESS_CONTENTS),
    ("subaru_d", "Subaru D connector", PartCategory::Harness, "For 2023+ Outback and Ascent with angle-based LKAS", Some("https://comma.ai/shop/harnesses/subaru-d"), HARNESS_CONTENTS),
    ("hyundai_a", "Hyundai A connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type A)", Some("https://comma.ai/shop/harnesses/hyundai-a"), HARNESS_CONTENTS),
    ("hyundai_b", "Hyundai B connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type B)", Some("https://comma.ai/shop/harnesses/hyundai-b"), HARNESS_CONTENTS),
    ("hyundai_c", "Hyundai C connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type C)", Some("https://comma.ai/shop/harnesses/hyundai-c"), HARNESS_CONTENTS),
    ("hyundai_g", "Hyundai G connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type G)", Some("https://comma.ai/shop/harnesses/hyundai-g"), HARNESS_CONTENTS),
    ("hyundai_k", "Hyundai K connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type K)", Some("https://comma.ai/shop/harnesses/hyundai-k"), HARNESS_CONTENTS),
    ("hyundai_q", "Hyundai Q connector", PartCategory::Harness, "For Hyundai/Kia vehicles (Type Q)", Some("https://comma.ai/shop/harnesses/hyundai-q"), HARNESS_CONTENTS),

    // Tools
    ("pry_tool", "Pry Tool", PartCategory::Tool, "For removing interior trim pieces", None, &[]),
    ("socket_8mm_deep", "Socket Wrench 8mm or 5/16\" (deep)", PartCategory::Tool, "For removing bolts during installation", None, &[]),
    ("torx_t20", "Torx T20 Screwdriver", PartCategory::Tool, "For Torx T20 screws", None, &[]),

    // Accessories and cables
    ("harness_box", "harness box", PartCategory::Accessory, "Protective box for the harness connection", None, &[]),
    ("comma_power_v2", "comma power v2", PartCategory::Accessory, "Power management for comma devices", Some("https://comma.ai/shop/comma-power"), &[]),
    ("rj45_cable_7ft", "RJ45 cable (7 ft)", PartCategory::Accessory, "Connects the harness box to the relay", None, &[]),
    ("long_obdc_cable", "long OBD-C cable", PartCategory::Accessory, "Extended cable for OBD-C connections", None, &[]),
    ("usbc_coupler", "USB-C coupler", PartCategory::Accessory, "Connects USB-C cables together", None, &[]),
    ("usb_a_2_a_cable", "USB A-A cable", PartCategory::Accessory, "USB A to A cable", None, &[]),
    ("usbc_otg_cable", "USB C OTG cable", PartCategory::Accessory, "USB-C On-The-Go cable", None, &[]),

    // Mounts
    ("regular_mount", "regular mount", PartCategory::Mount, "Standard mount for comma devices", None, &[]),
    ("angled_mount_8_degrees", "angled mount (8 degrees)", PartCategory::Mount, "Angled mount for vehicles requiring a tilted device", None, &[]),

    // Devices
    ("comma_3x", "comma 3X", PartCategory::Device, "Standard comma 3X device with regular mount", Some("https://comma.ai/shop/comma-3x"), &["regular_mount"]),
    ("comma_3x_angled_mount", "comma 3X with angled mount", PartCategory::Device, "comma 3X device with 8-degree angled mount", Some("https://comma.ai/shop/comma-3x"), &["angled_mount_8_degrees"]),
    ("red_panda", "red panda", PartCategory::Device, "CAN FD interface device", Some("https://comma.ai/shop/red-panda"), &[]),

    // Kits
    ("red_panda_kit", "red panda kit", PartCategory::Kit, "Complete kit with red panda", Some("https://comma.ai/shop/red-panda"), &["red_panda", "usb_a_2_a_cable", "usbc_otg_cable"]),
    ("canfd_kit", "CAN FD panda kit", PartCategory::Kit, "Required for vehicles with CAN FD", Some("https://comma.ai/shop/can-fd-panda-kit"), &["red_panda", "usbc_otg_cable", "usbc_coupler"]),
];

pub(super) fn parts() -> Result<Vec<PartDescriptor>, CatalogError> {
    ROWS.iter()
        .map(|&(id, name, category, description, url, children)| -> Result<_, CatalogError> {
            let children = children
                .iter()
                .map(|&child| PartId::try_from(child))
                .collect::<Result<Vec<_>, _>>()?;

            let mut part = PartDescriptor::new(PartId::try_from(id)?, name, category)
                .with_description(description)
                .with_children(children);
            if let Some(url) = url {
                part = part.with_url(url);
            }
            Ok(part)
        })
        .collect()
}

