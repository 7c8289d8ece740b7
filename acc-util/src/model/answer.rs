use std::io::{Read as _, Write};

use getset::Getters;
use serde::Serialize;

use crate::abs_path::AbsPathBuf;
use crate::model::{LangId, LangIdRef};
use crate::Result;

/// A solution to be submitted: the source code and the judge's id for its language.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Answer {
    lang_id: Option<LangId>,
    #[get = "pub"]
    source_code: String,
}

impl Answer {
    pub fn new(lang_id: Option<LangId>, source_code: impl Into<String>) -> Self {
        Self {
            lang_id,
            source_code: source_code.into(),
        }
    }

    /// Reads a source file. The language id is looked up from the file extension with
    /// `lang_id_of`; an unknown extension leaves it empty.
    pub fn load(
        path: &AbsPathBuf,
        lang_id_of: impl FnOnce(&str) -> Option<LangId>,
        cnsl: &mut dyn Write,
    ) -> Result<Self> {
        let source_code = path.load_pretty(
            |mut file| {
                let mut buf = String::new();
                file.read_to_string(&mut buf)?;
                Ok(buf)
            },
            cnsl,
        )?;
        let lang_id = path.extension().and_then(lang_id_of);
        Ok(Self::new(lang_id, source_code))
    }

    pub fn lang_id(&self) -> Option<LangIdRef> {
        self.lang_id.as_deref()
    }
}
