use chrono::{TimeZone, Utc};
use serde_json::json;
use sitelens_core::{
    build_chart_series, run_query, run_query_with, summarize, summarize_with, AggregateContext,
    Criteria, CrossReference, FinancialRecord, ProjectRecord, ProjectSortField, QueryParams,
    RadarAxis, SortDirection, TimelineCategory, TimelineRecord, TimelineSortField,
};

fn context() -> AggregateContext {
    AggregateContext::at(Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap())
}

fn timelines(value: serde_json::Value) -> Vec<TimelineRecord> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn empty_input_yields_zeroed_summary() {
    let records: Vec<&TimelineRecord> = Vec::new();
    let summary = summarize(&records, &context());

    assert_eq!(summary.count, 0);
    assert_eq!(summary.total_amount, 0.0);
    assert_eq!(summary.average_amount, 0.0);
    assert!(summary.status_counts.is_empty());

    let charts = build_chart_series(&records, &context());
    assert!(charts.categories.is_empty());
    assert!(charts.monthly.is_empty());
    assert!(charts.radar.iter().all(|point| point.average == 0.0));
}

#[test]
fn project_summary_counts_statuses_and_priorities() {
    let records: Vec<ProjectRecord> = serde_json::from_value(json!([
        { "id": "1", "status": "completed", "priority": "high", "budget": 20000 },
        { "id": "2", "status": "in progress", "priority": "high", "budget": "4,000" },
        { "id": "3", "status": "Completed", "budget": null },
        { "id": "4", "status": "mystery", "priority": "medium", "budget": 6000 }
    ]))
    .unwrap();
    let refs: Vec<&ProjectRecord> = records.iter().collect();

    let summary = summarize(&refs, &context());
    assert_eq!(summary.count, 4);
    assert_eq!(summary.total_amount, 30_000.0);
    assert_eq!(summary.average_amount, 7_500.0);
    assert_eq!(summary.status_counts["completed"], 2);
    assert_eq!(summary.status_counts["in_progress"], 1);
    assert_eq!(summary.status_counts["unknown"], 1);
    assert_eq!(summary.level_counts["high"], 2);
    assert_eq!(summary.level_counts.get("low"), None);
    assert_eq!(summary.high_cost_count, 1);
    assert_eq!(summary.completed_count, 2);
}

#[test]
fn monthly_series_keeps_latest_window_in_ascending_order() {
    let records = timelines(json!([
        { "date": "2024-08-15", "workers": [{ "hoursWorked": 8 }] },
        { "date": "2024-01-15" },
        { "date": "2024-03-15" },
        { "date": "2024-02-15" },
        { "date": "2024-05-15" },
        { "date": "2024-04-15" },
        { "date": "2024-07-15" },
        { "date": "2024-06-15" },
        { "date": "2024-08-02", "workers": [{ "hoursWorked": 4 }] },
        { "date": "unparseable" }
    ]));
    let refs: Vec<&TimelineRecord> = records.iter().collect();

    let charts = build_chart_series(&refs, &context());
    let labels: Vec<&str> = charts.monthly.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["2024-03", "2024-04", "2024-05", "2024-06", "2024-07", "2024-08"]
    );

    let august = charts.monthly.last().unwrap();
    assert_eq!(august.count, 2);
    assert_eq!(august.amount, 12.0);
}

#[test]
fn staff_breakdown_prefers_role_and_sorts_by_label() {
    let records = timelines(json!([
        {
            "workers": [{ "specialty": "mason" }, { "role": "" }],
            "engineers": [{ "specialtyOrRole": "structural" }]
        },
        { "workers": [{ "role": "mason" }], "architects": [{}] }
    ]));
    let refs: Vec<&TimelineRecord> = records.iter().collect();

    let charts = build_chart_series(&refs, &context());
    let breakdown: Vec<(&str, usize)> = charts
        .categories
        .iter()
        .map(|c| (c.category.as_str(), c.count))
        .collect();
    assert_eq!(
        breakdown,
        vec![("architect", 1), ("mason", 2), ("structural", 1), ("worker", 1)]
    );
}

#[test]
fn radar_averages_raw_values_per_axis() {
    let records = timelines(json!([
        { "workerCount": 4, "materials": [{ "cost": 1000 }], "notes": "ok" },
        { "workerCount": 2, "engineers": [{ "hoursWorked": 6 }] }
    ]));
    let refs: Vec<&TimelineRecord> = records.iter().collect();

    let radar = build_chart_series(&refs, &context()).radar;
    let average = |axis: RadarAxis| {
        radar
            .iter()
            .find(|point| point.axis == axis)
            .map(|point| point.average)
            .unwrap()
    };

    assert_eq!(radar.len(), RadarAxis::ALL.len());
    assert_eq!(average(RadarAxis::Workers), 3.0);
    assert_eq!(average(RadarAxis::Engineers), 0.5);
    assert_eq!(average(RadarAxis::Hours), 3.0);
    assert_eq!(average(RadarAxis::Cost), 500.0);
    assert_eq!(average(RadarAxis::Notes), 0.5);
}

#[test]
fn projects_have_no_radar_chart() {
    let records = vec![ProjectRecord::new("1", "Depot")];
    let refs: Vec<&ProjectRecord> = records.iter().collect();
    assert!(build_chart_series(&refs, &context()).radar.is_empty());
}

#[test]
fn linked_value_sums_each_project_code_once() {
    let records = timelines(json!([
        { "projectCode": "A" },
        { "projectCode": "A" },
        { "projectSummary": { "code": "B" } },
        { "projectCode": "C" },
        {}
    ]));
    let refs: Vec<&TimelineRecord> = records.iter().collect();

    let financials = vec![
        FinancialRecord::new("A", 100.0),
        FinancialRecord::new("A", 999.0),
        FinancialRecord::new("B", "$50"),
    ];
    let lookup = CrossReference::from_records(&financials);
    assert_eq!(lookup.len(), 2);

    let summary = summarize_with(&refs, &context(), &lookup);
    assert_eq!(summary.linked_value, 150.0);
    assert_eq!(summarize(&refs, &context()).linked_value, 0.0);
}

#[test]
fn aggregates_cover_the_filtered_set_not_the_page() {
    let records: Vec<ProjectRecord> = (1..=25)
        .map(|n| {
            let mut record = ProjectRecord::new(n.to_string(), format!("Project {n:02}"));
            record.budget = (n as f64 * 100.0).into();
            let month = if n <= 10 { 1 } else { 2 };
            record.created_at = Some(format!("2024-{month:02}-15"));
            record
        })
        .collect();

    let params = QueryParams::new(Criteria::at(Utc::now()))
        .with_sort(ProjectSortField::Budget, SortDirection::Desc)
        .with_page(3);
    let outcome = run_query(&records, &params);

    assert_eq!(outcome.summary.count, 25);
    assert_eq!(outcome.summary.total_amount, 32_500.0);
    assert_eq!(outcome.page.items.len(), 5);
    assert_eq!(outcome.page.items[0].id.as_str(), "5");
    assert_eq!(outcome.page.total_pages, 3);

    let monthly: Vec<(&str, usize, f64)> = outcome
        .charts
        .monthly
        .iter()
        .map(|p| (p.label.as_str(), p.count, p.amount))
        .collect();
    assert_eq!(
        monthly,
        vec![("2024-01", 10, 5_500.0), ("2024-02", 15, 27_000.0)]
    );
    assert_eq!(outcome.charts.categories.len(), 1);
    assert_eq!(outcome.charts.categories[0].count, 25);
}

#[test]
fn timeline_radar_covers_the_filtered_set_not_the_page() {
    let records: Vec<TimelineRecord> = (1..=25)
        .map(|n| {
            let mut record = TimelineRecord::new(n.to_string(), "2024-03-01");
            record.worker_count = (n as f64).into();
            record
        })
        .collect();

    let params = QueryParams::new(Criteria::at(Utc::now()))
        .with_sort(TimelineSortField::WorkerCount, SortDirection::Asc)
        .with_page_size(5);
    let outcome = run_query(&records, &params);

    assert_eq!(outcome.page.items.len(), 5);
    let workers = outcome
        .charts
        .radar
        .iter()
        .find(|point| point.axis == RadarAxis::Workers)
        .map(|point| point.average)
        .unwrap();
    assert_eq!(workers, 13.0);
    assert_eq!(outcome.charts.monthly.len(), 1);
    assert_eq!(outcome.charts.monthly[0].count, 25);
}

#[test]
fn linked_pipeline_respects_filters() {
    let records = timelines(json!([
        { "projectCode": "A", "projectSummary": { "location": "Lima" } },
        { "projectCode": "B", "projectSummary": { "location": "Cusco" } }
    ]));
    let lookup = CrossReference::from_records(&[
        FinancialRecord::new("A", 10.0),
        FinancialRecord::new("B", 20.0),
    ]);

    let criteria = Criteria::at(Utc::now()).with_category(TimelineCategory::Location, "Cusco");
    let params = QueryParams::new(criteria).with_sort(TimelineSortField::Date, SortDirection::Asc);
    let outcome = run_query_with(&records, &params, &lookup);

    assert_eq!(outcome.summary.count, 1);
    assert_eq!(outcome.summary.linked_value, 20.0);
}
