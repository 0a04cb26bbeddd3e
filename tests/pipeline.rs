mod common;

use std::fs;

use common::{SAMPLE_TEAM_COUNT, TestWorkspace, column, read_report, strings};
use wwc_report::config::PipelineConfig;
use wwc_report::error::PipelineError;
use wwc_report::pipeline::run_pipeline;

#[test]
fn pipeline_writes_every_report() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    let summary = run_pipeline(&config).expect("pipeline run");

    assert_eq!(summary.players, 9);
    assert_eq!(summary.teams, strings(&["Brazil", "China PR", "Morocco", "Spain"]));
    assert_eq!(
        summary.top_scorers,
        strings(&["Jennifer Hermoso", "Aitana Bonmatí"])
    );
    assert_eq!(summary.reports.len(), 8);
    for report in &summary.reports {
        assert!(report.exists(), "missing report {report:?}");
        assert!(report.starts_with(workspace.path()));
    }
}

#[test]
fn reshaped_players_gain_country_code_before_squad() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    let (headers, rows) = read_report(&config.output_path(&config.outputs.players));
    assert_eq!(
        headers,
        strings(&[
            "Rk",
            "Player",
            "Pos",
            "Country_Code",
            "Squad",
            "Age",
            "Born",
            "90s",
            "Gls",
            "Sh",
            "SoT",
        ])
    );
    assert_eq!(rows.len(), 9);
    assert_eq!(
        rows[0],
        strings(&[
            "1", "Ana Silva", "FW|MF", "BR", "Brazil", "24", "1999", "3.0", "1", "10", "4",
        ])
    );
    assert!(rows.iter().all(|row| row.len() == headers.len()));

    let raw = fs::read_to_string(config.output_path(&config.outputs.players)).unwrap();
    assert!(raw.starts_with("Rk,Player,Pos,Country_Code,Squad,"));
    assert!(raw.contains("\r\n"));
    assert!(!raw.contains('"'), "pipe-delimited positions need no quoting");
}

#[test]
fn multi_position_and_featured_rosters() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    assert_eq!(
        column(&config.output_path(&config.outputs.multi_position), "Player"),
        strings(&["Ana Silva", "Wang Shuang", "Anissa Lahmari"])
    );
    let china = workspace.path().join("stu-team-china.csv");
    assert_eq!(
        column(&china, "Player"),
        strings(&["Wang Shuang", "Zhang Rui"])
    );
    assert_eq!(column(&china, "Country_Code"), strings(&["CN", "CN"]));
    let morocco = workspace.path().join("stu-team-morocco.csv");
    assert_eq!(
        column(&morocco, "Player"),
        strings(&["Ibtissam Jraidi", "Anissa Lahmari"])
    );
}

#[test]
fn team_top_scorers_include_ties_in_country_order() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    assert_eq!(
        column(&config.output_path(&config.outputs.team_top_scorers), "Player"),
        strings(&[
            "Ana Silva",
            "Bia Costa",
            "Wang Shuang",
            "Ibtissam Jraidi",
            "Anissa Lahmari",
            "Jennifer Hermoso",
            "Aitana Bonmatí",
        ])
    );
}

#[test]
fn player_efficiency_appends_three_decimal_rates() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    let path = config.output_path(&config.outputs.player_efficiency);
    let (headers, rows) = read_report(&path);
    assert_eq!(headers.len(), 13);
    assert_eq!(
        &headers[11..],
        &strings(&["shots_conv_rate", "shots_on_target_conv_rate"])[..]
    );
    assert_eq!(&rows[0][11..], &strings(&["0.1", "0.25"])[..]);
    assert_eq!(&rows[7][11..], &strings(&["0.2", "0.375"])[..]);
    assert_eq!(&rows[8][11..], &strings(&["0.0", "0.0"])[..]);
}

#[test]
fn team_efficiency_uses_two_decimal_rates() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    let (headers, rows) = read_report(&config.output_path(&config.outputs.team_efficiency));
    assert_eq!(
        headers,
        strings(&[
            "country",
            "goals",
            "shots",
            "shots_on_target",
            "shots_conv_rate",
            "shots_on_target_conv_rate",
        ])
    );
    assert_eq!(
        rows,
        vec![
            strings(&["Brazil", "2", "15", "6", "0.13", "0.33"]),
            strings(&["China PR", "1", "8", "3", "0.12", "0.33"]),
            strings(&["Morocco", "2", "7", "3", "0.29", "0.67"]),
            strings(&["Spain", "6", "27", "14", "0.22", "0.43"]),
        ]
    );
}

#[test]
fn ratings_sort_by_rate_then_country() {
    let workspace = TestWorkspace::new();
    let config = workspace.sample_config();
    run_pipeline(&config).expect("pipeline run");

    let (headers, rows) = read_report(&config.output_path(&config.outputs.team_ratings));
    assert_eq!(headers.last().map(String::as_str), Some("efficiency_rating"));
    assert_eq!(
        rows,
        vec![
            strings(&["Morocco", "2", "7", "3", "0.29", "0.67", "Top Tier"]),
            strings(&["Spain", "6", "27", "14", "0.22", "0.43", "Top Tier"]),
            strings(&["Brazil", "2", "15", "6", "0.13", "0.33", "Upper Middle Tier"]),
            strings(&["China PR", "1", "8", "3", "0.12", "0.33", "Upper Middle Tier"]),
        ]
    );
}

#[test]
fn unexpected_team_count_aborts_after_early_reports() {
    let workspace = TestWorkspace::new();
    let config = PipelineConfig {
        expected_team_count: Some(32),
        ..workspace.sample_config()
    };
    let err = run_pipeline(&config).unwrap_err();
    assert_eq!(
        err.downcast_ref::<PipelineError>(),
        Some(&PipelineError::UnexpectedTeamCount {
            expected: 32,
            found: SAMPLE_TEAM_COUNT,
        })
    );
    assert!(config.output_path(&config.outputs.players).exists());
    assert!(!config.output_path(&config.outputs.team_ratings).exists());
}

#[test]
fn non_integer_goals_fail_fast() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "bad.csv",
        "Rk,Player,Pos,Squad,Age,Born,90s,Gls,Sh,SoT\n\
         1,Ana,FW,br Brazil,24,1999,3.0,one,10,4\n",
    );
    let config = PipelineConfig {
        input,
        expected_team_count: None,
        ..workspace.sample_config()
    };
    let err = run_pipeline(&config).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("'one' is not an integer"), "{message}");
    assert!(!config.output_path(&config.outputs.players).exists());
}

#[test]
fn missing_column_is_reported_by_name() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "short.csv",
        "Rk,Player,Pos,Squad,Age,Born,90s,Gls,Sh\n1,Ana,FW,br Brazil,24,1999,3.0,1,10\n",
    );
    let config = PipelineConfig {
        input,
        expected_team_count: None,
        ..workspace.sample_config()
    };
    let err = run_pipeline(&config).unwrap_err();
    assert!(format!("{err:#}").contains("Column 'SoT' not found"));
}

#[test]
fn tab_delimited_input_and_lf_output() {
    let workspace = TestWorkspace::new();
    let source = fs::read_to_string(common::fixture_path(common::SAMPLE_FILE)).unwrap();
    let mut tsv = String::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(source.as_bytes());
    for record in reader.records() {
        let record = record.unwrap();
        tsv.push_str(&record.iter().collect::<Vec<_>>().join("\t"));
        tsv.push('\n');
    }
    let input = workspace.write("players.tsv", &tsv);
    let config = PipelineConfig {
        input,
        line_ending: wwc_report::io_utils::LineEnding::Lf,
        ..workspace.sample_config()
    };
    run_pipeline(&config).expect("pipeline run");

    let ratings = fs::read_to_string(config.output_path(&config.outputs.team_ratings)).unwrap();
    assert!(!ratings.contains('\r'));
    assert!(ratings.starts_with("country\tgoals\t"));
    assert!(ratings.contains("Morocco\t2\t7\t3\t0.29\t0.67\tTop Tier\n"));
}

#[test]
fn shooting_cells_pass_through_player_reports_verbatim() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "padded.csv",
        "Rk,Player,Pos,Squad,Age,Born,90s,Gls,Sh,SoT\n\
         1,Ana,FW,br Brazil,24,1999,1.0,01, 25,20\n\
         2,Bia,MF,br Brazil,26,1997,2.0,2,34,+6\n",
    );
    let config = PipelineConfig {
        input,
        expected_team_count: None,
        ..workspace.sample_config()
    };
    run_pipeline(&config).expect("pipeline run");

    let players = fs::read_to_string(config.output_path(&config.outputs.players)).unwrap();
    assert!(players.contains("1,Ana,FW,BR,Brazil,24,1999,1.0,01, 25,20\r\n"), "{players}");
    assert!(players.contains(",2.0,2,34,+6\r\n"), "{players}");

    let (_, rows) = read_report(&config.output_path(&config.outputs.player_efficiency));
    assert_eq!(&rows[0][8..], &strings(&["01", " 25", "20", "0.04", "0.05"])[..]);
    assert_eq!(&rows[1][8..], &strings(&["2", "34", "+6", "0.059", "0.333"])[..]);

    let (_, teams) = read_report(&config.output_path(&config.outputs.team_efficiency));
    assert_eq!(teams, vec![strings(&["Brazil", "3", "59", "26", "0.05", "0.12"])]);
}
