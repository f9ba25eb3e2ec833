use super::model::{Model, VarIndex};
use crate::common::defs::*;
use crate::error::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

impl Model {
    /// Writes the model in CPLEX LP format. Write-only: there is no reader.
    pub fn write_lp<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "\\ Bellman optimality LP")?;
        writeln!(w, "Minimize")?;
        let objective = self
            .objective()
            .iter()
            .enumerate()
            .map(|(i, &c)| (VarIndex(i), c))
            .collect::<Vec<_>>();
        write!(w, " obj: ")?;
        self.write_expr(w, &objective)?;
        writeln!(w)?;

        writeln!(w, "Subject To")?;
        for row in self.constraints() {
            write!(w, " bellman_{}_{}: ", row.state, row.action)?;
            if row.terms.is_empty() {
                write!(w, "0 {}", self.var_name(VarIndex(0)))?;
            } else {
                self.write_expr(w, &row.terms)?;
            }
            writeln!(w, " >= {}", row.rhs)?;
        }

        writeln!(w, "Bounds")?;
        for i in 0..self.variables().len() {
            writeln!(w, " {} free", self.var_name(VarIndex(i)))?;
        }

        writeln!(w, "End")
    }

    pub fn save_lp(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.write_lp(&mut w)?;
        w.flush()?;

        info!(event = "model_written", path = %path.display());
        Ok(())
    }

    fn var_name(&self, var: VarIndex) -> String {
        format!("v_{}", self.state_of(var))
    }

    fn write_expr<W: Write>(&self, w: &mut W, terms: &[(VarIndex, Continous)]) -> io::Result<()> {
        for (i, &(var, c)) in terms.iter().enumerate() {
            match (i, c < 0.) {
                (0, false) => {}
                (0, true) => write!(w, "-")?,
                (_, false) => write!(w, " + ")?,
                (_, true) => write!(w, " - ")?,
            }
            if c.abs() != 1. {
                write!(w, "{} ", c.abs())?;
            }
            write!(w, "{}", self.var_name(var))?;
        }
        Ok(())
    }
}
