// Shared test catalog.

use crate::domain::Catalog;

pub const CATALOG_JSON: &str = r#"{
    "program": {
        "name": "Computer Science BS",
        "description": "Undergraduate computer science program",
        "catalogYear": "2024-2025",
        "totalCredits": 120
    },
    "categories": [
        {"id": "core", "name": "Core Computer Science", "description": "Required CS courses"},
        {"id": "math", "name": "Mathematics", "description": "Supporting mathematics"},
        {"id": "electives", "name": "Electives", "description": "No courses yet"}
    ],
    "exclusiveGroups": [
        {"id": "calculus", "title": "Calculus Sequence", "description": "Take either MATH201 or MATH205, not both."}
    ],
    "courses": [
        {"code": "CS101", "title": "Introduction to Programming", "credits": 3, "category": "core",
         "notes": ["Offered every semester"]},
        {"code": "CS201", "title": "Data Structures", "credits": 3, "category": "core",
         "prerequisites": [{"type": "all", "courses": ["CS101"]}]},
        {"code": "CS301", "title": "Operating Systems", "credits": 4, "category": "core",
         "subcategory": "Systems",
         "prerequisites": [
             {"type": "all", "courses": ["CS201"]},
             {"type": "any", "courses": ["MATH201", "MATH205"], "detail": "one calculus course"}
         ],
         "info": "Includes a weekly lab."},
        {"code": "CS350", "title": "Algorithms", "credits": 3, "category": "core",
         "prerequisites": [{"type": "all", "courses": ["CS201", "MATH101"]}]},
        {"code": "MATH101", "title": "Discrete Mathematics", "credits": 3, "category": "math"},
        {"code": "MATH201", "title": "Calculus I", "credits": 4, "category": "math",
         "exclusiveGroup": "calculus"},
        {"code": "MATH205", "title": "Applied Calculus", "credits": 4, "category": "math",
         "exclusiveGroup": "calculus"}
    ]
}"#;

pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).expect("fixture catalog should parse")
}
