//! Tests for explicit timezone formatting

use chrono::{TimeZone, Utc};
use core_kernel::Timezone;

#[test]
fn test_default_is_utc() {
    let tz = Timezone::default();
    let utc = Utc.with_ymd_and_hms(2024, 1, 31, 23, 5, 0).unwrap();

    assert_eq!(tz.format(utc, "%d/%m/%Y %H:%M"), "31/01/2024 23:05");
}

#[test]
fn test_same_instant_formats_differently_per_timezone() {
    let utc = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
    let paris: Timezone = "Europe/Paris".parse().unwrap();
    let new_york: Timezone = "America/New_York".parse().unwrap();

    assert_eq!(paris.format(utc, "%d/%m/%Y %H:%M"), "01/01/2024 04:00");
    assert_eq!(new_york.format(utc, "%d/%m/%Y %H:%M"), "31/12/2023 22:00");
}

#[test]
fn test_formatting_does_not_leak_between_calls() {
    let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let tokyo: Timezone = "Asia/Tokyo".parse().unwrap();

    let _ = tokyo.format(utc, "%H:%M");
    assert_eq!(Timezone::default().format(utc, "%H:%M"), "12:00");
}

#[test]
fn test_display_is_iana_name() {
    let tz: Timezone = "Europe/London".parse().unwrap();
    assert_eq!(tz.to_string(), "Europe/London");
}
