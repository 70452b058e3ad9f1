//! Shared fixtures for integration tests.

use std::fmt::Write as _;
use std::path::PathBuf;

use polars::prelude::*;

const EDUCATION: [&str; 6] = [
    "none",
    "high school",
    "some college",
    "associate",
    "bachelor",
    "master",
];
const EMPLOYMENT: [&str; 3] = ["unemployed", "part-time", "full-time"];

/// Deterministic per-row survey values shared by the frame and CSV
/// fixtures.
fn row_values(i: usize) -> (&'static str, i64, &'static str, &'static str, [f64; 6]) {
    let gender = if i % 2 == 0 { "male" } else { "female" };
    let age = 18 + (i % 50) as i64;
    let education = EDUCATION[i % EDUCATION.len()];
    let employment = EMPLOYMENT[i % EMPLOYMENT.len()];

    // Scores spread across the range so median and quantile splits both
    // produce two classes; gains vary in sign.
    let computer = ((i * 7) % 41) as f64;
    let internet = ((i * 11) % 37) as f64;
    let mobile = ((i * 13) % 43) as f64;
    let scores = [
        computer,
        computer + ((i % 9) as f64) - 3.0,
        internet,
        internet + ((i % 7) as f64) - 2.0,
        mobile,
        mobile + ((i % 5) as f64) - 1.0,
    ];
    (gender, age, education, employment, scores)
}

/// Build an in-memory survey frame with `n` rows.
pub fn survey_frame(n: usize) -> DataFrame {
    let mut gender = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut education = Vec::with_capacity(n);
    let mut employment = Vec::with_capacity(n);
    let mut scores: [Vec<f64>; 6] = Default::default();

    for i in 0..n {
        let (g, a, ed, em, s) = row_values(i);
        gender.push(g);
        age.push(a);
        education.push(ed);
        employment.push(em);
        for (col, v) in scores.iter_mut().zip(s) {
            col.push(v);
        }
    }

    df! {
        "Gender" => gender,
        "Age" => age,
        "Education_Level" => education,
        "Employment_Status" => employment,
        "Basic_Computer_Knowledge_Score" => scores[0].clone(),
        "Post_Basic_Computer_Knowledge_Score" => scores[1].clone(),
        "Internet_Usage_Score" => scores[2].clone(),
        "Post_Internet_Usage_Score" => scores[3].clone(),
        "Mobile_Literacy_Score" => scores[4].clone(),
        "Post_Mobile_Literacy_Score" => scores[5].clone(),
    }
    .unwrap()
}

/// Render the same survey data as CSV text.
pub fn survey_csv(n: usize) -> String {
    let mut out = String::from(
        "Gender,Age,Education_Level,Employment_Status,\
         Basic_Computer_Knowledge_Score,Post_Basic_Computer_Knowledge_Score,\
         Internet_Usage_Score,Post_Internet_Usage_Score,\
         Mobile_Literacy_Score,Post_Mobile_Literacy_Score\n",
    );
    for i in 0..n {
        let (g, a, ed, em, s) = row_values(i);
        writeln!(
            out,
            "{g},{a},{ed},{em},{},{},{},{},{},{}",
            s[0], s[1], s[2], s[3], s[4], s[5]
        )
        .unwrap();
    }
    out
}

/// Write a survey CSV into the given temp dir and return its path.
pub fn write_survey_csv(dir: &tempfile::TempDir, n: usize) -> PathBuf {
    let path = dir.path().join("survey.csv");
    std::fs::write(&path, survey_csv(n)).unwrap();
    path
}
