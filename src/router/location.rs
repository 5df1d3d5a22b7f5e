use std::collections::BTreeMap;
use std::fmt;

pub type Params = BTreeMap<String, String>;

/// One path segment with its matrix parameters (`search;term=Adele`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    pub path: String,
    pub params: Params,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let path = decode(parts.next().unwrap_or_default());
        let params = parts
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (decode(key), decode(value)),
                None => (decode(part), String::new()),
            })
            .collect();
        Self { path, params }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&urlencoding::encode(&self.path))?;
        for (key, value) in &self.params {
            write!(
                f,
                ";{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

/// An application URL: the part of a hash URL after `#`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub segments: Vec<Segment>,
}

impl Location {
    /// Parses `/a/b;k=v`, `#/a/b` or `a/b`. Empty segments are ignored.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let segments = trimmed
            .split('/')
            .filter(|part| !part.is_empty())
            .map(Segment::parse)
            .collect();
        Self { segments }
    }

    pub fn is_absolute(raw: &str) -> bool {
        raw.trim_start_matches('#').starts_with('/')
    }

    /// Attaches `params` as matrix parameters of the last segment.
    pub fn with_params(mut self, params: Params) -> Self {
        if params.is_empty() {
            return self;
        }
        match self.segments.last_mut() {
            Some(last) => last.params.extend(params),
            None => self.segments.push(Segment {
                path: String::new(),
                params,
            }),
        }
        self
    }

    pub fn join(&self, relative: &Location) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
