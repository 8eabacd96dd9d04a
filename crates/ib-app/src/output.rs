//! Output sinks and their scheduling.

use crate::error::{AppError, AppResult};
use ib_core::Real;
use ib_model::State;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A write-only consumer of states.
pub trait Output {
    fn name(&self) -> &str;

    fn init(&mut self) -> AppResult<()> {
        Ok(())
    }

    fn write(&mut self, x: &State) -> AppResult<()>;

    fn finish(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// One line of the force log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForceRecord {
    pub step: u64,
    pub time: Real,
    pub fx: Real,
    pub fy: Real,
}

impl ForceRecord {
    pub fn from_state(x: &State) -> Self {
        let (fx, fy) = x.compute_net_force();
        Self {
            step: x.timestep,
            time: x.time,
            fx,
            fy,
        }
    }
}

/// Net force per step as JSON lines.
pub struct ForceLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl ForceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl ToString) -> AppError {
        AppError::Output {
            sink: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Read a force log back.
    pub fn read(path: &Path) -> AppResult<Vec<ForceRecord>> {
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| AppError::Output {
                    sink: path.display().to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl Output for ForceLog {
    fn name(&self) -> &str {
        "force log"
    }

    fn init(&mut self) -> AppResult<()> {
        let file = File::create(&self.path).map_err(|e| self.error(e))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn write(&mut self, x: &State) -> AppResult<()> {
        if self.writer.is_none() {
            return Err(self.error("written before init"));
        }
        let record = ForceRecord::from_state(x);
        let line = serde_json::to_string(&record).map_err(|e| self.error(e))?;
        let result = match self.writer.as_mut() {
            Some(writer) => writeln!(writer, "{line}"),
            None => Ok(()),
        };
        result.map_err(|e| self.error(e))
    }

    fn finish(&mut self) -> AppResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| self.error(e))?;
        }
        Ok(())
    }
}

/// Restart files `<dir>/<name>NNNNN.bin`, one per written step.
pub struct RestartWriter {
    dir: PathBuf,
    name: String,
}

impl RestartWriter {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn path_for(&self, timestep: u64) -> PathBuf {
        self.dir.join(format!("{}{:05}.bin", self.name, timestep))
    }
}

impl Output for RestartWriter {
    fn name(&self) -> &str {
        "restart"
    }

    fn write(&mut self, x: &State) -> AppResult<()> {
        let path = self.path_for(x.timestep);
        x.save(&path).map_err(|e| AppError::Output {
            sink: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Calls each output every `n` steps.
#[derive(Default)]
pub struct Logger {
    outputs: Vec<(Box<dyn Output>, u64)>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `output` every `every` steps; zero disables it.
    pub fn add_output(&mut self, output: Box<dyn Output>, every: u64) {
        if every == 0 {
            debug!(output = output.name(), "output disabled");
            return;
        }
        self.outputs.push((output, every));
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn init(&mut self) -> AppResult<()> {
        for (output, _) in &mut self.outputs {
            output.init()?;
        }
        Ok(())
    }

    /// Write `x` to every output whose interval divides the step counter.
    pub fn do_output(&mut self, x: &State) -> AppResult<()> {
        for (output, every) in &mut self.outputs {
            if x.timestep % *every == 0 {
                output.write(x)?;
            }
        }
        Ok(())
    }

    pub fn finish(&mut self) -> AppResult<()> {
        for (output, _) in &mut self.outputs {
            output.finish()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_grid::Grid;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<u64>>>);

    impl Output for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn write(&mut self, x: &State) -> AppResult<()> {
            self.0.borrow_mut().push(x.timestep);
            Ok(())
        }
    }

    fn state() -> State {
        State::new(&Grid::new(4, 4, 1.0, 0.0, 0.0).unwrap(), 2)
    }

    #[test]
    fn logger_respects_intervals() {
        let every3 = Rc::new(RefCell::new(Vec::new()));
        let every1 = Rc::new(RefCell::new(Vec::new()));
        let mut logger = Logger::new();
        logger.add_output(Box::new(Recorder(every3.clone())), 3);
        logger.add_output(Box::new(Recorder(every1.clone())), 1);
        logger.add_output(Box::new(Recorder(Rc::new(RefCell::new(Vec::new())))), 0);
        assert_eq!(logger.len(), 2);

        let mut x = state();
        logger.init().unwrap();
        for step in 0..=7 {
            x.timestep = step;
            logger.do_output(&x).unwrap();
        }
        logger.finish().unwrap();
        assert_eq!(*every3.borrow(), vec![0, 3, 6]);
        assert_eq!(every1.borrow().len(), 8);
    }

    #[test]
    fn force_log_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.force.jsonl");
        let mut log = ForceLog::new(&path);
        log.init().unwrap();
        let mut x = state();
        x.f.set(0, 1.0, -0.5);
        x.f.set(1, 2.0, 0.25);
        x.timestep = 3;
        x.time = 0.5;
        log.write(&x).unwrap();
        log.finish().unwrap();

        let records = ForceLog::read(&path).unwrap();
        assert_eq!(
            records,
            vec![ForceRecord {
                step: 3,
                time: 0.5,
                fx: 3.0,
                fy: -0.25
            }]
        );
    }

    #[test]
    fn force_log_needs_init() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ForceLog::new(dir.path().join("f.jsonl"));
        assert!(log.write(&state()).is_err());
    }

    #[test]
    fn restart_files_are_numbered_by_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut restart = RestartWriter::new(dir.path(), "cyl");
        let mut x = state();
        x.timestep = 42;
        restart.write(&x).unwrap();
        let path = dir.path().join("cyl00042.bin");
        assert_eq!(restart.path_for(42), path);

        let mut y = state();
        assert!(y.load(&path));
        assert_eq!(y, x);
    }
}
