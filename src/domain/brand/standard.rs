//! Built-in brand tables.

use super::BrandRules;
use crate::domain::{
    footnote::{Column, FootnoteDefinition},
    part::{InvalidPartIdError, PartId},
    rules::{FlagRule, RuleTable},
};

pub(super) fn brands() -> Result<Vec<BrandRules>, InvalidPartIdError> {
    Ok(vec![honda()?, hyundai()?, subaru(), toyota()])
}

fn note(text: &str, columns: &[Column]) -> FootnoteDefinition {
    FootnoteDefinition::new(text, columns)
}

mod honda_flags {
    pub const BOSCH_EXT_HUD: u64 = 1;
    pub const BOSCH_ALT_BRAKE: u64 = 1 << 1;
    pub const BOSCH: u64 = 1 << 2;
    pub const BOSCH_RADARLESS: u64 = 1 << 3;
    pub const NIDEC: u64 = 1 << 4;
    pub const NIDEC_ALT_PCM_ACCEL: u64 = 1 << 5;
    pub const NIDEC_ALT_SCM_MESSAGES: u64 = 1 << 6;
    pub const BOSCH_CANFD: u64 = 1 << 7;
}

fn honda() -> Result<BrandRules, InvalidPartIdError> {
    use honda_flags::{
        BOSCH, BOSCH_ALT_BRAKE, BOSCH_CANFD, BOSCH_EXT_HUD, BOSCH_RADARLESS, NIDEC,
        NIDEC_ALT_PCM_ACCEL, NIDEC_ALT_SCM_MESSAGES,
    };

    let alt_brake = note(
        "Uses an alternate brake message; braking may feel different.",
        &[Column::Longitudinal],
    );
    let radarless = note(
        "Camera-only platform; adaptive cruise is provided by the camera.",
        &[Column::Longitudinal],
    );
    let canfd = note("Uses CAN FD communication.", &[Column::Model]);
    let civic_diesel = note(
        "2019 Honda Civic 1.6L Diesel Sedan does not have ALC below 12mph.",
        &[Column::FsrSteering],
    );

    // The harness is chosen by the ADAS supplier flags alone.
    Ok(BrandRules::new("honda")
        .with_flag("BOSCH_EXT_HUD", BOSCH_EXT_HUD)
        .with_flag("BOSCH_ALT_BRAKE", BOSCH_ALT_BRAKE)
        .with_flag("BOSCH", BOSCH)
        .with_flag("BOSCH_RADARLESS", BOSCH_RADARLESS)
        .with_flag("NIDEC", NIDEC)
        .with_flag("NIDEC_ALT_PCM_ACCEL", NIDEC_ALT_PCM_ACCEL)
        .with_flag("NIDEC_ALT_SCM_MESSAGES", NIDEC_ALT_SCM_MESSAGES)
        .with_flag("BOSCH_CANFD", BOSCH_CANFD)
        .with_footnote("alt_brake", alt_brake.clone())
        .with_footnote("radarless", radarless.clone())
        .with_footnote("canfd", canfd.clone())
        .with_footnote("civic_diesel", civic_diesel)
        .with_table(
            RuleTable::new()
                .with_rule(FlagRule::when_set(BOSCH_ALT_BRAKE).footnote("alt_brake", alt_brake))
                .with_rule(FlagRule::when_set(BOSCH_RADARLESS).footnote("radarless", radarless))
                .with_rule(FlagRule::when_set(BOSCH_CANFD).footnote("canfd", canfd))
                .with_rule(
                    FlagRule::when_set(BOSCH | BOSCH_CANFD)
                        .requires(PartId::try_from("honda_bosch_c")?),
                )
                .with_rule(
                    FlagRule::when(BOSCH | BOSCH_RADARLESS, BOSCH_CANFD)
                        .requires(PartId::try_from("honda_bosch_b")?),
                )
                .with_rule(
                    FlagRule::when(BOSCH, BOSCH_CANFD | BOSCH_RADARLESS)
                        .requires(PartId::try_from("honda_bosch_a")?),
                )
                .with_rule(
                    FlagRule::when_clear(BOSCH).requires(PartId::try_from("honda_nidec")?),
                ),
        ))
}

mod hyundai_flags {
    pub const CANFD: u64 = 1;
    pub const MANDO_RADAR: u64 = 1 << 1;
    pub const MIN_STEER_32_MPH: u64 = 1 << 2;
    pub const CAMERA_SCC: u64 = 1 << 3;
}

fn hyundai() -> Result<BrandRules, InvalidPartIdError> {
    use hyundai_flags::{CAMERA_SCC, CANFD, MANDO_RADAR, MIN_STEER_32_MPH};

    let scc = note(
        "Requires Smart Cruise Control (SCC)",
        &[Column::Longitudinal, Column::SteeringTorque],
    );
    let min_speed = note("Minimum engage speed is 32 mph (51 km/h)", &[Column::FsrSteering]);
    let radar_scc = note("Uses radar-based Smart Cruise Control", &[Column::Longitudinal]);
    let camera_scc = note("Uses camera-based Smart Cruise Control", &[Column::Longitudinal]);
    let canfd = note("Uses CAN FD communication", &[Column::Model]);

    Ok(BrandRules::new("hyundai")
        .with_flag("CANFD", CANFD)
        .with_flag("MANDO_RADAR", MANDO_RADAR)
        .with_flag("MIN_STEER_32_MPH", MIN_STEER_32_MPH)
        .with_flag("CAMERA_SCC", CAMERA_SCC)
        .with_footnote("scc", scc.clone())
        .with_footnote("min_speed", min_speed.clone())
        .with_footnote("radar_scc", radar_scc.clone())
        .with_footnote("camera_scc", camera_scc.clone())
        .with_footnote("canfd", canfd.clone())
        .with_table(
            RuleTable::new()
                .with_base("scc", scc)
                .with_rule(
                    FlagRule::when_set(CANFD)
                        .footnote("canfd", canfd)
                        .requires(PartId::try_from("canfd_kit")?),
                )
                .with_rule(FlagRule::when_set(MANDO_RADAR).footnote("radar_scc", radar_scc))
                .with_rule(FlagRule::when_set(CAMERA_SCC).footnote("camera_scc", camera_scc))
                .with_rule(FlagRule::when_set(MIN_STEER_32_MPH).footnote("min_speed", min_speed)),
        ))
}

mod subaru_flags {
    pub const GLOBAL_GEN2: u64 = 1;
    pub const LKAS_ANGLE: u64 = 1 << 1;
    pub const STEER_RATE_LIMITED: u64 = 1 << 2;
    pub const PREGLOBAL: u64 = 1 << 3;
    pub const HYBRID: u64 = 1 << 4;
}

fn subaru() -> BrandRules {
    use subaru_flags::{GLOBAL_GEN2, HYBRID, LKAS_ANGLE, PREGLOBAL, STEER_RATE_LIMITED};

    let eyesight = note("Requires EyeSight with Lane Keep Assist", &[Column::Package]);
    let global = note(
        "In the non-US market, openpilot requires the car to come equipped with EyeSight with \
         Lane Keep Assistance.",
        &[Column::Package],
    );
    let angle_lkas = note("Uses angle-based Lane Keep Assist System", &[Column::SteeringTorque]);
    let torque_lkas = note("Uses torque-based Lane Keep Assist System", &[Column::SteeringTorque]);
    let steer_rate = note(
        "Vehicle may temporarily fault when steering angle rate exceeds threshold",
        &[Column::SteeringTorque],
    );
    let exp_long = note(
        "Enabling longitudinal control (alpha) will disable all EyeSight functionality, \
         including AEB, LDW, and RAB.",
        &[Column::Longitudinal],
    );

    BrandRules::new("subaru")
        .with_flag("GLOBAL_GEN2", GLOBAL_GEN2)
        .with_flag("LKAS_ANGLE", LKAS_ANGLE)
        .with_flag("STEER_RATE_LIMITED", STEER_RATE_LIMITED)
        .with_flag("PREGLOBAL", PREGLOBAL)
        .with_flag("HYBRID", HYBRID)
        .with_footnote("eyesight", eyesight.clone())
        .with_footnote("global", global.clone())
        .with_footnote("steer_rate", steer_rate.clone())
        .with_footnote("exp_long", exp_long.clone())
        .with_table(
            RuleTable::new()
                .with_experimental_longitudinal("exp_long", exp_long)
                .with_base("eyesight", eyesight)
                .with_base("global", global)
                .with_rule(FlagRule::when_set(LKAS_ANGLE).footnote("lkas", angle_lkas))
                .with_rule(FlagRule::when_clear(LKAS_ANGLE).footnote("lkas", torque_lkas))
                .with_rule(
                    FlagRule::when_set(STEER_RATE_LIMITED).footnote("steer_rate", steer_rate),
                ),
        )
}

fn toyota() -> BrandRules {
    BrandRules::new("toyota").with_footnote(
        "camry",
        note(
            "openpilot operates above 28mph for Camry 4CYL L, 4CYL LE and 4CYL SE which don't \
             have Full-Speed Range Dynamic Radar Cruise Control.",
            &[Column::FsrLongitudinal],
        ),
    )
}
