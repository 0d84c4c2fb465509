use chrono::NaiveDate;
use std::env;
use tehsil_weather::{Dashboard, DashboardConfig, Parameter, Severity};

/// Usage: render_day [parameter] [yyyy-mm-dd] [state]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    configure_polars_display();
    let mut args = env::args().skip(1);
    let parameter: Parameter = args.next().as_deref().unwrap_or("rain").parse()?;
    let date = match args.next() {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
        None => NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
    };
    let state = args.next();

    let dashboard = Dashboard::new(DashboardConfig::builder().data_dir("data").build());

    let render = match dashboard
        .render()
        .parameter(parameter)
        .date(date)
        .maybe_state(state.as_deref())
        .call()
        .await
    {
        Ok(render) => render,
        Err(err) if err.severity() == Severity::Warning => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if let Some((first, last)) = render.date_bounds {
        println!("{parameter} data covers {first} to {last}");
    }
    println!("{} records on {date}", render.records_for_date);
    println!("{}", render.preview(10));
    println!(
        "{} / {} / {}",
        render.cascade.state, render.cascade.district, render.cascade.tehsil
    );
    println!("{}", render.detail());
    println!("{}", render.map.aggregated);
    println!("{:#?}", render.join_report);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
