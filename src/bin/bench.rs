//! Benchmark for the optimize pipeline on the demo data sets.
//!
//! Run with: cargo run --release --bin bench

use roster_optimizer::config::OptimizeContext;
use roster_optimizer::constraints::{build_model, ObjectivePolicy};
use roster_optimizer::demo_data::{self, DemoData};
use roster_optimizer::eligibility;
use roster_optimizer::error::RosterResult;
use roster_optimizer::optimize::optimize;
use roster_optimizer::solver::MilpSolver;
use std::time::Instant;

fn main() -> RosterResult<()> {
    let solver = MilpSolver::new();

    println!("Benchmark: Optimize Pipeline (good_lp/microlp)");
    println!();

    for demo in [DemoData::Small, DemoData::Large, DemoData::Understaffed] {
        let request = demo_data::generate(demo);
        let settings = request.validate(u64::MAX)?;

        // Model construction alone, without the solve
        let build_start = Instant::now();
        let eligibility = eligibility::filter(&request.employees, &request.open_shifts);
        let built = build_model(
            &request.employees,
            &request.open_shifts,
            &eligibility,
            &settings,
            ObjectivePolicy::Weighted,
        );
        let build_time = build_start.elapsed();

        let solve_start = Instant::now();
        let response = optimize(&request, &OptimizeContext::default(), &solver)?;
        let solve_time = solve_start.elapsed();

        println!("{}:", demo.as_str());
        println!("  Employees: {}", request.employees.len());
        println!("  Shifts: {}", request.open_shifts.len());
        println!("  Eligible pairs: {}", eligibility.pair_count());
        println!("  Variables: {}", built.model.var_count());
        println!("  Constraints: {}", built.model.constraints().len());
        println!("  Build time: {:.2?}", build_time);
        println!("  Optimize time: {:.2?}", solve_time);
        println!("  Status: {}", response.status);
        println!(
            "  Assigned: {}/{}",
            response.diagnostics.assigned_shifts, response.diagnostics.total_shifts
        );
        if let Some(fitness) = response.fitness {
            println!("  Fitness: {}", fitness);
        }
        println!();
    }

    Ok(())
}
