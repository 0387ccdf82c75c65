//! Parse input configuration file

use std::path::Path;
use std::ops::Add;
use yaml_rust::{YamlLoader, yaml::Yaml};
use evalexpr::*;

mod error;
mod types;

pub use error::*;
use types::*;

/// Represents the input configuration, which defines values
/// for the process parameters, and any automatic values
/// for those parameters.
pub struct Config {
    input: Yaml,
    ctx: HashMapContext,
}

impl Config {
    /// Loads a configuration file.
    /// Fails if the file cannot be opened or if it is not
    /// YAML-formatted.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|_| InputError::file())?;
        Self::from_string(&contents)
    }

    /// Loads a YAML configuration from a string.
    /// Fails if the string is not formatted correctly.
    pub fn from_string(s: &str) -> Result<Self, InputError> {
        let input = YamlLoader::load_from_str(s)
            .map_err(|_| InputError::file())?;
        let input = input.first()
            .ok_or(InputError::file())?;

        Ok(Config {
            input: input.clone(),
            ctx: HashMapContext::new(),
        })
    }

    /// Loads automatic values for constants and mathematical functions,
    /// then reads and evaluates any expressions given in the specified
    /// `section` so they can be referenced elsewhere in the file.
    pub fn with_context(&mut self, section: &str) -> Result<&mut Self, InputError> {
        use helper::context_function;

        let mut ctx = context_map! {
            "pi" => std::f64::consts::PI,
            "femto" => 1.0e-15,
            "pico" => 1.0e-12,
            "nano" => 1.0e-9,
            "micro" => 1.0e-6,
            "milli" => 1.0e-3,
            "kilo" => 1.0e3,
            "mega" => 1.0e6,
        }.unwrap();

        context_function!(ctx, "sqrt", f64::sqrt);
        context_function!(ctx, "abs",  f64::abs);
        context_function!(ctx, "exp",  f64::exp);
        context_function!(ctx, "ln",   f64::ln);
        context_function!(ctx, "sin",  f64::sin);
        context_function!(ctx, "cos",  f64::cos);
        context_function!(ctx, "tan",  f64::tan);

        self.ctx = ctx;

        // Read in from 'constants' block if it exists
        if self.input[section].is_badvalue() {
            return Ok(self);
        }

        for (a, b) in self.input[section].as_hash().unwrap() {
            // grab the value, if possible
            let (key, value) = match (a, b) {
                (Yaml::String(k), Yaml::Integer(i)) => (Some(k), Some(*i as f64)),
                (Yaml::String(k), Yaml::Real(s)) => (Some(k), s.parse::<f64>().ok()),
                (Yaml::String(k), Yaml::String(s)) => (Some(k), eval_number_with_context(s, &self.ctx).ok()),
                _ => (None, None),
            };

            // insert it into the context so it's available for the next read
            if let Some(v) = value {
                let key = key.unwrap(); // if value.is_some() so is key
                self.ctx.set_value(key.clone(), Value::from(v))
                    .map_err(|_| {
                        eprintln!("Failed to insert {} = {} from constants block into context.", key, v);
                        InputError::conversion(section, key)
                    })?
            } else if let Some(k) = key {
                // found a key, value pair but parsing failed
                Err(InputError::conversion(section, k))?
            }
        }

        Ok(self)
    }

    /// Locates a key-value pair in the configuration file and attempts
    /// to parse the value as the specified type.
    /// The path to the key-value pair is specified by a string of colon-separated
    /// sections, e.g. `'section:subsection:key'`.
    pub fn read<T, S>(&self, path: S) -> Result<T, InputError>
    where
        T: FromYaml,
        S: AsRef<str>,
    {
        let address: Vec<&str> = path.as_ref().split(':').collect();
        let value = address.iter()
          .try_fold(&self.input, |y, s| {
              if y[*s].is_badvalue() {
                  Err(InputError::location(path.as_ref(), s))
              } else {
                  Ok(&y[*s])
              }
          });
        value.and_then(|arg| T::from_yaml(arg.clone(), &self.ctx).map_err(|_| InputError::conversion(path.as_ref(), address.last().unwrap())))
    }

    /// Parses a string argument and evaluates it using the default context. Extends
    /// ```
    /// let arg = "2.0";
    /// let val = arg.parse::<f64>().unwrap();
    /// ```
    /// to handle mathematical expressions, e.g.
    /// ```
    /// let arg = "2.0 / (1.0 + rate)";
    /// let val = input.evaluate(arg).unwrap();
    /// ```
    /// where 'rate' is specified in the constants block of the input file.
    #[allow(unused)]
    pub fn evaluate<S: AsRef<str>>(&self, arg: S) -> Option<f64> {
        eval_number_with_context(arg.as_ref(), &self.ctx).ok()
    }

    /// Locates a key-value pair in the configuration file and attempts
    /// to parse it as a looped variable, returning a Vec of the values.
    /// The loop is defined by a `start`, `stop` and `step`:
    ///
    /// ```
    /// let text: &str = "---
    ///     x:
    ///         start: 1.0
    ///         stop: 1.5
    ///         step: 0.1
    /// ";
    ///
    /// let values: Vec<f64> = Config::from_string(&text).unwrap()
    ///     .read_loop("x").unwrap();
    ///
    /// assert_eq!(values, vec![1.0, 1.1, 1.2, 1.3, 1.4, 1.5]);
    /// ```
    pub fn read_loop<T, S>(&self, path: S) -> Result<Vec<T>, InputError>
    where
        T: FromYaml + PartialOrd + Add<Output=T> + Copy,
        S: AsRef<str> {
        let key = path.as_ref();

        if self.read::<T, _>(format!("{}{}", key, ":start").as_str()).is_err() {
            let value = self.read(path)?;
            let v = vec![value];
            Ok(v)
        }
        else { // 'start' value found
            let start = self.read(format!("{}{}", key, ":start").as_str())?;
            let stop = self.read(format!("{}{}", key, ":stop").as_str())?;
            let step = self.read(format!("{}{}", key, ":step").as_str())?;

            // the step has to advance the loop, or it never terminates
            if start + step <= start {
                return Err(InputError::conversion(key, "step"));
            }

            let mut v: Vec<T> = Vec::new();
            let mut x = start;
            while x <= stop {
                v.push(x);
                x = x + step;
            }
            Ok(v)
        }
    }
}

mod helper {
    macro_rules! context_function {
        ($ctx:expr, $name:literal, $func:expr) => {
            $ctx.set_function(
                $name.to_string(),
                Function::new(|arg| {
                    let x = arg.as_number()?;
                    Ok(Value::Float($func(x)))
                })
            ).unwrap()
        };
    }

    pub(super) use context_function;
}

#[cfg(test)]
mod tests {
    use std::f64::consts;
    use super::*;

    #[test]
    fn config_parser() {
        let text = "---
        process:
          branching_rate: 1.0
          extinction_rate: r0
          creation_rate_ratio: 0.5 * N

        series:
          precision: 16000

        extra:
          rates: [0.0, r0, 1.0, 2.0 * pi]

        constants:
          N: 2.0
          r0: 0.1

        deep:
          nested:
            section:
              key: 1.0
        ";

        let mut config = Config::from_string(&text).unwrap();
        config.with_context("constants").unwrap();

        // Plain f64
        let s: f64 = config.read("process:branching_rate").unwrap();
        assert_eq!(s, 1.0);

        // Plain usize
        let precision: usize = config.read("series:precision").unwrap();
        assert_eq!(precision, 16000);

        // Looks up the constants block
        let r: f64 = config.read("process:extinction_rate").unwrap();
        assert_eq!(r, 0.1);

        // Evaluates a math expr
        let g: f64 = config.read("process:creation_rate_ratio").unwrap();
        assert_eq!(g, 1.0);

        // Array of f64
        let rates: Vec<f64> = config.read("extra:rates").unwrap();
        assert_eq!(rates, vec![0.0, 0.1, 1.0, 2.0 * consts::PI]);

        // Scalar promoted to a one-element array
        let rates: Vec<f64> = config.read("process:extinction_rate").unwrap();
        assert_eq!(rates, vec![0.1]);

        let key: f64 = config.read("deep:nested:section:key").unwrap();
        assert_eq!(key, 1.0);

        // Missing key
        let missing: Result<f64, _> = config.read("process:missing");
        assert!(missing.is_err());

        // Evaluate an arbitrary string
        let val = config.evaluate("1.0 / (1.0 + N)").unwrap();
        assert_eq!(val, 1.0 / 3.0);
    }

    #[test]
    fn looper() {
        // Test extraction of single value
        let text: &str = "---
        process:
            extinction_rate: 0.1
        ";
        let mut config = Config::from_string(&text).unwrap();
        let values: Vec<f64> = config.read_loop("process:extinction_rate").unwrap();
        assert_eq!(values, vec![0.1; 1]);

        // Test extraction of looped values
        let text: &str = "---
        process:
            extinction_rate:
                start: 0.1
                stop: 0.5
                step: 0.1
        ";
        config = Config::from_string(&text).unwrap();
        let values: Vec<f64> = config.read_loop("process:extinction_rate").unwrap();
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 0.1);
        assert!((values[4] - 0.5).abs() < 1.0e-9);

        // A step that does not advance the loop is rejected
        let text: &str = "---
        process:
            extinction_rate:
                start: 0.1
                stop: 0.5
                step: 0.0
        ";
        config = Config::from_string(&text).unwrap();
        let values: Result<Vec<f64>, _> = config.read_loop("process:extinction_rate");
        assert!(values.is_err());

        let text: &str = "---
        process:
            extinction_rate:
                start: 0.1
                stop: 0.5
                step: -0.1
        ";
        config = Config::from_string(&text).unwrap();
        let values: Result<Vec<f64>, _> = config.read_loop("process:extinction_rate");
        assert!(values.is_err());
    }
}
