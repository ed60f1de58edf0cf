// example/src/main.rs

use prototext::*;
use prototext_schema::{TYPE_STRING, TYPE_UINT32};

fn main() -> Result<(), TextError> {
    // Build the address-book schema in code. The same schema could come
    // from a JSON file through `schema_from_json`.
    let schema = Schema::new(vec![
        Def::new(
            "Address".to_owned(),
            DefKind::Message,
            vec![Field {
                name: "city".to_owned(),
                type_id: TYPE_STRING,
                repeated: false,
                oneof_index: None,
                number: 1,
            }],
        ),
        Def::new(
            "Person".to_owned(),
            DefKind::Message,
            vec![
                Field {
                    name: "name".to_owned(),
                    type_id: TYPE_STRING,
                    repeated: false,
                    oneof_index: None,
                    number: 1,
                },
                Field {
                    name: "age".to_owned(),
                    type_id: TYPE_UINT32,
                    repeated: false,
                    oneof_index: None,
                    number: 2,
                },
                Field {
                    name: "address".to_owned(),
                    type_id: 0,
                    repeated: false,
                    oneof_index: None,
                    number: 3,
                },
            ],
        ),
    ]);
    verify_schema(&schema)?;

    let text = r#"
        # A minimal address-book entry.
        name: "Ada"
        age: 36
        address {
          city: "London"
        }
    "#;

    let person = parse_from_string(&schema, "Person", text, &ParseOptions::default())?;

    println!("parsed   = {:?}", person);
    println!("age      = {}", person.get("age").map(Value::as_u32).unwrap_or(0));

    // Regenerate the canonical form; reparsing it yields the same value.
    let canonical = generate_to_string(&schema, &person)?;
    println!("canonical:\n{}", canonical);

    let reparsed = parse_from_string(&schema, "Person", &canonical, &ParseOptions::default())?;
    assert_eq!(person, reparsed);

    Ok(())
}
