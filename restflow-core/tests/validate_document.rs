use restflow_core::{parse_template_document, validate_document, Validate};

#[test]
fn accepts_a_well_formed_sequence() {
    let doc = parse_template_document(
        r#"
rest_calls:
  - method: POST
    url: /login
    payload:
      user: "{{ user }}"
    response_expectation: [status, "^OK$"]
    response_translation:
      token: token
    recoverable_codes: [503]
  - method: GET
    url: "/api/{{ token }}"
    headers:
      X-Retry: 1
    response_format: xml
    response_unexpectation: [[error, ".*"], [status, "FAIL"]]
    hosts: [a.example, b.example]
    port: 8443
    ssl: true
"#,
    )
    .unwrap();
    doc.validate().unwrap();
}

#[test]
fn reports_every_violation_with_its_path() {
    let doc = parse_template_document(
        r#"
rest_calls:
  - url: /missing-method
  - method: GET
    url: /x
    response_format: yaml
    response_expectation: status
    response_translation: {a: true}
    recoverable_codes: [700]
    colour: blue
  - just a string
"#,
    )
    .unwrap();
    let err = validate_document(&doc).unwrap_err();
    let mut paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        vec![
            "rest_calls[0].method",
            "rest_calls[1].colour",
            "rest_calls[1].recoverable_codes[0]",
            "rest_calls[1].response_expectation",
            "rest_calls[1].response_format",
            "rest_calls[1].response_translation",
            "rest_calls[2]",
        ]
    );
    let format = err
        .violations
        .iter()
        .find(|v| v.path == "rest_calls[1].response_format")
        .unwrap();
    assert!(format.message.contains("yaml"));
}

#[test]
fn broken_expressions_are_violations_and_templated_values_are_not_shape_checked() {
    let doc = parse_template_document(
        r#"
rest_calls:
  - method: GET
    url: "/x/{{ id"
    response_format: "{{ fmt }}"
    response_translation: "{{ not a path }}"
"#,
    )
    .unwrap();
    let err = validate_document(&doc).unwrap_err();
    let mut paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(
        paths,
        vec!["rest_calls[0].response_translation", "rest_calls[0].url"]
    );
}

#[test]
fn empty_document_is_valid() {
    validate_document(&parse_template_document("").unwrap()).unwrap();
    validate_document(&parse_template_document("rest_calls: []").unwrap()).unwrap();
}
