use crate::error::{EbmError, EbmResult};
use crate::grid::{Cell, GridMapper, GridState};
use crate::params::PhysicalParameterField;
use crate::physics::{EbmKernel, KernelSettings};
use crate::sim::clock::SimulationClock;
use crate::sim::config::EbmConfig;
use crate::sim_op::{EnergyBalanceOp, InitialStateOp, SimOp, SimOpHandle};
use crate::solar::SolarForcing;
use colored::Colorize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct OpTiming {
    pub op_name: String,
    pub init_time: Duration,
    pub total_update_time: Duration,
    pub update_call_count: u32,
    pub min_update_time: Duration,
    pub max_update_time: Duration,
    /// Summed over every step; kept apart from the update statistics.
    pub after_step_time: Duration,
    pub after_time: Duration,
}

impl OpTiming {
    pub fn new(op_name: String) -> Self {
        Self {
            op_name,
            init_time: Duration::ZERO,
            total_update_time: Duration::ZERO,
            update_call_count: 0,
            min_update_time: Duration::MAX,
            max_update_time: Duration::ZERO,
            after_step_time: Duration::ZERO,
            after_time: Duration::ZERO,
        }
    }

    fn record_update(&mut self, elapsed: Duration) {
        self.total_update_time += elapsed;
        self.update_call_count += 1;
        self.min_update_time = self.min_update_time.min(elapsed);
        self.max_update_time = self.max_update_time.max(elapsed);
    }

    pub fn avg_update_time(&self) -> Duration {
        if self.update_call_count > 0 {
            self.total_update_time / self.update_call_count
        } else {
            Duration::ZERO
        }
    }

    pub fn total_time(&self) -> Duration {
        self.init_time + self.total_update_time + self.after_step_time + self.after_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Update,
    AfterStep,
    After,
}

pub struct Simulation {
    pub name: String,
    pub mapper: GridMapper,
    pub params: Arc<PhysicalParameterField>,
    pub forcing: Arc<dyn SolarForcing>,
    pub settings: KernelSettings,
    pub grid: GridState,
    pub clock: SimulationClock,
    pub ops: Vec<Box<dyn SimOp>>,
    pub sim_steps: u32,
    pub report_timing: bool,
    pub op_timings: Vec<OpTiming>,
    initialized: bool,
}

pub struct SimProps {
    pub name: &'static str,
    pub mapper: GridMapper,
    pub params: PhysicalParameterField,
    pub forcing: Arc<dyn SolarForcing>,
    pub settings: KernelSettings,
    pub clock: SimulationClock,
    pub ops: Vec<SimOpHandle>,
    pub sim_steps: u32,
    pub report_timing: bool,
}

impl Simulation {
    pub fn new(props: SimProps) -> EbmResult<Simulation> {
        props.params.ensure_matches(&props.mapper)?;
        props.settings.validate()?;
        if !(props.clock.dt_days > 0.0) {
            return Err(EbmError::Configuration(format!(
                "dt_days must be positive, got {}",
                props.clock.dt_days
            )));
        }

        let ops: Vec<Box<dyn SimOp>> = props.ops.into_iter().map(|handle| handle.op).collect();
        let op_timings = ops.iter().map(|op| OpTiming::new(op.name().to_string())).collect();

        Ok(Simulation {
            name: props.name.to_string(),
            mapper: props.mapper,
            params: Arc::new(props.params),
            forcing: props.forcing,
            settings: props.settings,
            grid: GridState::uniform(props.mapper, Cell::default()),
            clock: props.clock,
            ops,
            sim_steps: props.sim_steps,
            report_timing: props.report_timing,
            op_timings,
            initialized: false,
        })
    }

    /// Builds a simulation from a validated config. The initial-state and
    /// energy-balance operators are placed ahead of `extra_ops`.
    pub fn from_config(config: &EbmConfig, name: &'static str, extra_ops: Vec<SimOpHandle>) -> EbmResult<Simulation> {
        config.validate()?;
        let mapper = config.mapper()?;
        let mut ops = vec![
            InitialStateOp::handle_from_run(&config.run),
            EnergyBalanceOp::handle(),
        ];
        ops.extend(extra_ops);

        Simulation::new(SimProps {
            name,
            mapper,
            params: config.parameter_field(mapper)?,
            forcing: config.solar_forcing()?,
            settings: config.kernel_settings(),
            clock: config.clock(),
            ops,
            sim_steps: config.run.steps,
            report_timing: false,
        })
    }

    pub fn current_step(&self) -> u32 {
        self.clock.step
    }

    pub fn kernel(&self) -> EbmResult<EbmKernel> {
        EbmKernel::new(self.mapper, self.params.clone(), self.forcing.clone(), self.settings)
    }

    /// Runs every operator's `init_sim` once.
    pub fn initialize(&mut self) -> EbmResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.simulate_phase(Phase::Init)?;
        if let Some(index) = self.grid.current().iter().position(|cell| !cell.is_finite()) {
            return Err(EbmError::NonFiniteState { step: 0, index });
        }
        self.initialized = true;
        Ok(())
    }

    /// Advances the model by one step with the registered operators.
    ///
    /// On error the previous snapshot stays current and the clock does not move.
    pub fn step(&mut self) -> EbmResult<()> {
        self.initialize()?;
        self.grid.reset_next_state();
        if let Err(e) = self.simulate_phase(Phase::Update) {
            self.grid.reset_next_state();
            return Err(e);
        }
        self.commit_step()?;
        self.simulate_phase(Phase::AfterStep)
    }

    /// Run a single step with custom operators (for testing)
    pub fn step_with_ops(&mut self, ops: &mut [&mut dyn SimOp]) -> EbmResult<()> {
        self.grid.reset_next_state();
        for op in ops.iter_mut() {
            if let Err(e) = op.update_sim(self) {
                self.grid.reset_next_state();
                return Err(e);
            }
        }
        self.commit_step()?;
        for op in ops.iter_mut() {
            op.after_step(self)?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> EbmResult<()> {
        self.initialize()?;
        while self.clock.step < self.sim_steps {
            self.step()?;
        }
        self.simulate_phase(Phase::After)?;
        if self.report_timing {
            self.print_timing_report();
        }
        Ok(())
    }

    fn commit_step(&mut self) -> EbmResult<()> {
        if let Some(index) = self.grid.first_non_finite_next() {
            self.grid.reset_next_state();
            return Err(EbmError::NonFiniteState {
                step: self.clock.step + 1,
                index,
            });
        }
        self.grid.commit_next_state();
        self.clock.advance();
        Ok(())
    }

    fn simulate_phase(&mut self, phase: Phase) -> EbmResult<()> {
        let mut ops = std::mem::take(&mut self.ops);
        let result = self.run_ops(&mut ops, phase);
        self.ops = ops;
        result
    }

    fn run_ops(&mut self, ops: &mut [Box<dyn SimOp>], phase: Phase) -> EbmResult<()> {
        for (i, op) in ops.iter_mut().enumerate() {
            let start = Instant::now();
            match phase {
                Phase::Init => op.init_sim(self)?,
                Phase::Update => op.update_sim(self)?,
                Phase::AfterStep => op.after_step(self)?,
                Phase::After => op.after_sim(self)?,
            }
            let elapsed = start.elapsed();
            let timing = &mut self.op_timings[i];
            match phase {
                Phase::Init => timing.init_time = elapsed,
                Phase::Update => timing.record_update(elapsed),
                Phase::AfterStep => timing.after_step_time += elapsed,
                Phase::After => timing.after_time = elapsed,
            }
        }
        Ok(())
    }

    pub fn print_timing_report(&self) {
        println!("\n{}", "📊 === SIMULATION TIMING REPORT ===".bold());
        println!("🔄 Total steps: {}", self.clock.step);
        println!("⏱️  Days per step: {}", self.clock.dt_days);
        println!("🌐 Grid: {}x{} ({} cells)", self.mapper.nx, self.mapper.ny, self.mapper.len());
        println!();

        let total_time: Duration = self.op_timings.iter().map(OpTiming::total_time).sum();

        println!("📈 PER-OPERATION BREAKDOWN:");
        for timing in &self.op_timings {
            let total_op_time = timing.total_time();
            let percentage = if total_time.as_nanos() > 0 {
                total_op_time.as_secs_f64() / total_time.as_secs_f64() * 100.0
            } else {
                0.0
            };
            let (min, max) = if timing.update_call_count > 0 {
                (timing.min_update_time, timing.max_update_time)
            } else {
                (Duration::ZERO, Duration::ZERO)
            };

            println!(
                "  🔧 {:<22} | Total: {:>9.2}ms | Avg/step: {:>8.3}ms | Min: {:>8.3}ms | Max: {:>8.3}ms | Init: {:>7.2}ms | After steps: {:>8.2}ms | Share: {:>5.1}%",
                timing.op_name.cyan(),
                total_op_time.as_secs_f64() * 1e3,
                timing.avg_update_time().as_secs_f64() * 1e3,
                min.as_secs_f64() * 1e3,
                max.as_secs_f64() * 1e3,
                timing.init_time.as_secs_f64() * 1e3,
                timing.after_step_time.as_secs_f64() * 1e3,
                percentage
            );
        }

        let steps = self.clock.step.max(1) as f64;
        println!();
        println!(
            "⏱️  TOTAL SIMULATION TIME: {:.2}ms ({:.2}s)",
            total_time.as_secs_f64() * 1e3,
            total_time.as_secs_f64()
        );
        println!("🚀 Average time per step: {:.3}ms", total_time.as_secs_f64() * 1e3 / steps);
        if total_time.as_secs_f64() > 0.0 {
            println!("💫 Steps per second: {:.2}", steps / total_time.as_secs_f64());
        }
        println!("{}\n", "📊 === END TIMING REPORT ===".bold());
    }
}
