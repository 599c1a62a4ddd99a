use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

/// Attendance schedule as configured by an admin. All fields optional except
/// grace: an empty config simply evaluates to `Unconfigured`.
#[derive(Debug, Clone, Default)]
pub struct WindowConfig {
    /// Wall-clock daily start, `HH:MM` 24-hour. Malformed values are treated
    /// as absent, never as an error.
    pub daily_start_time: Option<String>,
    /// One-shot override date. Only effective when it equals today.
    pub active_date: Option<NaiveDate>,
    /// Explicit start instant paired with `active_date`.
    pub override_start: Option<NaiveDateTime>,
    pub grace_minutes: u32,
    pub off_days: BTreeSet<NaiveDate>,
    pub off_day_reasons: BTreeMap<NaiveDate, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    BeforeStart,
    OnTimeWindow,
    LateWindow,
    OffDay,
    Unconfigured,
}

/// Result of one evaluation. Start/threshold are present only when a start
/// instant could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindowSnapshot {
    pub phase: Phase,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub start: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub late_threshold: Option<NaiveDateTime>,
    pub is_off_day: bool,
    /// Empty when today is not an off-day or no reason was recorded.
    pub off_day_reason: String,
}

/// Strict `HH:MM` 24-hour parse. Anything else (including `9:00`) is None.
pub fn parse_daily_start(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Pure phase derivation: no clock reads, no side effects. Evaluating twice
/// with the same inputs yields the same snapshot.
pub fn evaluate(config: &WindowConfig, now: NaiveDateTime) -> WindowSnapshot {
    let today = now.date();

    // Off-day wins over everything, including a configured override.
    if config.off_days.contains(&today) {
        return WindowSnapshot {
            phase: Phase::OffDay,
            start: None,
            late_threshold: None,
            is_off_day: true,
            off_day_reason: config
                .off_day_reasons
                .get(&today)
                .cloned()
                .unwrap_or_default(),
        };
    }

    let start = resolve_start(config, today);

    let Some(start) = start else {
        return WindowSnapshot {
            phase: Phase::Unconfigured,
            start: None,
            late_threshold: None,
            is_off_day: false,
            off_day_reason: String::new(),
        };
    };

    let late_threshold = start + Duration::minutes(i64::from(config.grace_minutes));

    // The `<=` at the threshold is deliberate: arriving exactly at
    // start + grace still counts as on-time.
    let phase = if now < start {
        Phase::BeforeStart
    } else if now <= late_threshold {
        Phase::OnTimeWindow
    } else {
        Phase::LateWindow
    };

    WindowSnapshot {
        phase,
        start: Some(start),
        late_threshold: Some(late_threshold),
        is_off_day: false,
        off_day_reason: String::new(),
    }
}

fn resolve_start(config: &WindowConfig, today: NaiveDate) -> Option<NaiveDateTime> {
    if config.active_date == Some(today) {
        if let Some(start) = config.override_start {
            return Some(start);
        }
    }

    config
        .daily_start_time
        .as_deref()
        .and_then(parse_daily_start)
        .map(|t| today.and_time(t))
}

impl WindowSnapshot {
    /// On-time marking needs an open on-time window and no record yet.
    pub fn can_mark_on_time(&self, already_marked: bool) -> bool {
        self.phase == Phase::OnTimeWindow && !already_marked
    }

    /// Late marking additionally requires a non-empty reason.
    pub fn can_mark_late(&self, already_marked: bool, reason: &str) -> bool {
        self.phase == Phase::LateWindow && !already_marked && !reason.trim().is_empty()
    }

    /// Leave may be requested in any schedule phase (including before-start
    /// and unconfigured) but never on a designated off-day.
    pub fn can_mark_leave(&self, already_marked: bool) -> bool {
        !self.is_off_day && !already_marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(2026, 3, 2).and_hms_opt(h, min, s).unwrap()
    }

    fn daily_config(start: &str, grace: u32) -> WindowConfig {
        WindowConfig {
            daily_start_time: Some(start.to_string()),
            grace_minutes: grace,
            ..WindowConfig::default()
        }
    }

    #[test]
    fn before_start_phase() {
        let snap = evaluate(&daily_config("09:00", 15), at(8, 59, 59));
        assert_eq!(snap.phase, Phase::BeforeStart);
        assert_eq!(snap.start, Some(at(9, 0, 0)));
        assert_eq!(snap.late_threshold, Some(at(9, 15, 0)));
    }

    #[test]
    fn within_grace_is_on_time() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 10, 0));
        assert_eq!(snap.phase, Phase::OnTimeWindow);
        assert_eq!(snap.late_threshold, Some(at(9, 15, 0)));
    }

    #[test]
    fn exactly_at_start_is_on_time() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 0, 0));
        assert_eq!(snap.phase, Phase::OnTimeWindow);
    }

    #[test]
    fn exactly_at_threshold_is_still_on_time() {
        // Boundary tie-break favors on-time. Easy to invert by accident.
        let snap = evaluate(&daily_config("09:00", 15), at(9, 15, 0));
        assert_eq!(snap.phase, Phase::OnTimeWindow);
    }

    #[test]
    fn one_second_past_threshold_is_late() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 15, 1));
        assert_eq!(snap.phase, Phase::LateWindow);
    }

    #[test]
    fn past_grace_is_late() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 20, 0));
        assert_eq!(snap.phase, Phase::LateWindow);
    }

    #[test]
    fn zero_grace_collapses_window_to_start_instant() {
        let config = daily_config("09:00", 0);
        assert_eq!(evaluate(&config, at(9, 0, 0)).phase, Phase::OnTimeWindow);
        assert_eq!(evaluate(&config, at(9, 0, 1)).phase, Phase::LateWindow);
    }

    #[test]
    fn malformed_start_time_degrades_to_unconfigured() {
        for bad in ["25:99", "", "9:00", "12:5", "ab:cd", "12.30"] {
            let snap = evaluate(&daily_config(bad, 15), at(9, 0, 0));
            assert_eq!(snap.phase, Phase::Unconfigured, "input {bad:?}");
            assert_eq!(snap.start, None);
        }
    }

    #[test]
    fn absent_start_time_is_unconfigured() {
        let snap = evaluate(&WindowConfig::default(), at(9, 0, 0));
        assert_eq!(snap.phase, Phase::Unconfigured);
        assert_eq!(snap.late_threshold, None);
    }

    #[test]
    fn override_for_today_takes_precedence_over_daily_schedule() {
        let mut config = daily_config("09:00", 15);
        config.active_date = Some(date(2026, 3, 2));
        config.override_start = Some(at(13, 30, 0));

        let snap = evaluate(&config, at(13, 40, 0));
        assert_eq!(snap.phase, Phase::OnTimeWindow);
        assert_eq!(snap.start, Some(at(13, 30, 0)));
        assert_eq!(snap.late_threshold, Some(at(13, 45, 0)));
    }

    #[test]
    fn stale_override_falls_through_to_daily_schedule() {
        // Yesterday's override must not leak into today.
        let mut config = daily_config("09:00", 15);
        config.active_date = Some(date(2026, 3, 1));
        config.override_start = Some(date(2026, 3, 1).and_hms_opt(13, 30, 0).unwrap());

        let snap = evaluate(&config, at(9, 5, 0));
        assert_eq!(snap.phase, Phase::OnTimeWindow);
        assert_eq!(snap.start, Some(at(9, 0, 0)));
    }

    #[test]
    fn override_date_without_instant_uses_daily_schedule() {
        let mut config = daily_config("09:00", 15);
        config.active_date = Some(date(2026, 3, 2));

        let snap = evaluate(&config, at(9, 5, 0));
        assert_eq!(snap.start, Some(at(9, 0, 0)));
    }

    #[test]
    fn off_day_overrides_schedule_and_override() {
        let mut config = daily_config("09:00", 15);
        config.active_date = Some(date(2026, 3, 2));
        config.override_start = Some(at(13, 30, 0));
        config.off_days.insert(date(2026, 3, 2));
        config
            .off_day_reasons
            .insert(date(2026, 3, 2), "Public holiday".to_string());

        for now in [at(0, 0, 0), at(9, 5, 0), at(23, 59, 59)] {
            let snap = evaluate(&config, now);
            assert_eq!(snap.phase, Phase::OffDay);
            assert!(snap.is_off_day);
            assert_eq!(snap.off_day_reason, "Public holiday");
            assert_eq!(snap.start, None);
            assert_eq!(snap.late_threshold, None);
        }
    }

    #[test]
    fn off_day_without_reason_yields_empty_string() {
        let mut config = WindowConfig::default();
        config.off_days.insert(date(2026, 3, 2));

        let snap = evaluate(&config, at(10, 0, 0));
        assert_eq!(snap.phase, Phase::OffDay);
        assert_eq!(snap.off_day_reason, "");
    }

    #[test]
    fn off_day_on_another_date_has_no_effect() {
        let mut config = daily_config("09:00", 15);
        config.off_days.insert(date(2026, 3, 3));

        assert_eq!(evaluate(&config, at(9, 5, 0)).phase, Phase::OnTimeWindow);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let mut config = daily_config("09:00", 15);
        config.off_days.insert(date(2026, 3, 5));
        let now = at(9, 12, 33);

        assert_eq!(evaluate(&config, now), evaluate(&config, now));
    }

    #[test]
    fn strict_hh_mm_parse() {
        assert_eq!(
            parse_daily_start("09:00"),
            NaiveTime::from_hms_opt(9, 0, 0)
        );
        assert_eq!(
            parse_daily_start("23:59"),
            NaiveTime::from_hms_opt(23, 59, 0)
        );
        assert_eq!(parse_daily_start("24:00"), None);
        assert_eq!(parse_daily_start("09:60"), None);
        assert_eq!(parse_daily_start("09:00:00"), None);
        assert_eq!(parse_daily_start(" 9:00"), None);
    }

    // Gating rules.

    #[test]
    fn mark_on_time_requires_open_window_and_no_record() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 5, 0));
        assert!(snap.can_mark_on_time(false));
        assert!(!snap.can_mark_on_time(true));
        assert!(!snap.can_mark_late(false, "traffic"));
    }

    #[test]
    fn mark_late_requires_reason() {
        let snap = evaluate(&daily_config("09:00", 15), at(9, 30, 0));
        assert!(snap.can_mark_late(false, "traffic"));
        assert!(!snap.can_mark_late(false, ""));
        assert!(!snap.can_mark_late(false, "   "));
        assert!(!snap.can_mark_late(true, "traffic"));
        assert!(!snap.can_mark_on_time(false));
    }

    #[test]
    fn leave_allowed_in_any_schedule_phase_but_not_off_day() {
        let before = evaluate(&daily_config("09:00", 15), at(8, 0, 0));
        assert!(before.can_mark_leave(false));

        let unconfigured = evaluate(&WindowConfig::default(), at(8, 0, 0));
        assert!(unconfigured.can_mark_leave(false));
        assert!(!unconfigured.can_mark_leave(true));

        let mut config = WindowConfig::default();
        config.off_days.insert(date(2026, 3, 2));
        let off = evaluate(&config, at(8, 0, 0));
        assert!(!off.can_mark_leave(false));
        assert!(!off.can_mark_on_time(false));
        assert!(!off.can_mark_late(false, "any"));
    }
}
