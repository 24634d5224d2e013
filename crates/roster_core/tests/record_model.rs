use roster_core::{FieldViolation, Member, Review, Unit, MIN_REVIEW_YEAR};

#[test]
fn unsaved_records_serialize_with_null_id() {
    let unit = Unit::new("Engineering", "Building A").unwrap();

    let json = serde_json::to_value(&unit).unwrap();
    assert!(json["id"].is_null());
    assert_eq!(json["name"], "Engineering");
    assert_eq!(json["location"], "Building A");
}

#[test]
fn member_and_review_use_snake_case_fields() {
    let member = Member::new("Asha", "Engineer", 3).unwrap();
    let json = serde_json::to_value(&member).unwrap();
    assert_eq!(json["job_title"], "Engineer");
    assert_eq!(json["unit_id"], 3);

    let review = Review::new(2024, "Solid quarter", 5).unwrap();
    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["year"], 2024);
    assert_eq!(json["member_id"], 5);
}

#[test]
fn whitespace_only_text_is_rejected_everywhere() {
    for blank in ["", " ", "\t", "\n  \r"] {
        assert_eq!(
            Unit::new(blank, "Building A").unwrap_err().violation,
            FieldViolation::Blank
        );
        assert_eq!(Member::new("Asha", blank, 1).unwrap_err().field, "job_title");
        assert_eq!(Review::new(2024, blank, 1).unwrap_err().field, "summary");
    }
}

#[test]
fn review_year_lower_bound_is_inclusive() {
    assert!(Review::new(MIN_REVIEW_YEAR, "ok", 1).is_ok());
    assert!(Review::new(MIN_REVIEW_YEAR - 1, "too early", 1).is_err());
}

#[test]
fn field_errors_render_readable_messages() {
    let err = Review::new(1999, "Solid quarter", 1).unwrap_err();
    assert_eq!(err.to_string(), "review.year must be 2000 or later, got 1999");

    let err = Unit::new("Engineering", "").unwrap_err();
    assert_eq!(err.to_string(), "unit.location must be a non-empty string");
}
