// SPDX-FileCopyrightText: 2026 Tubecast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ffmpeg argument construction.

use std::ffi::OsString;
use std::path::Path;

use tubecast_core::TrackTags;

/// Output encoding used for every conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionProfile {
    pub codec: String,
    pub bitrate: String,
    pub container: String,
}

impl Default for ConversionProfile {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate: "160k".to_string(),
            container: "ipod".to_string(),
        }
    }
}

impl ConversionProfile {
    /// Audio-only conversion from stdin into `output`.
    pub fn convert_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-i",
            "pipe:0",
            "-hide_banner",
            "-vn",
            "-c:a",
            self.codec.as_str(),
            "-b:a",
            self.bitrate.as_str(),
            "-f",
            self.container.as_str(),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Stream copy of `input` into `output` with tags and an optional cover.
    pub fn tag_args(
        &self,
        input: &Path,
        tags: &TrackTags,
        cover: Option<&Path>,
        output: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-nostdin".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-hide_banner".into(),
        ];
        match cover {
            Some(cover) => {
                args.extend(["-i".into(), cover.as_os_str().to_owned()]);
                args.extend(
                    ["-map", "0", "-map", "1", "-c", "copy", "-disposition:v:0", "attached_pic"]
                        .map(OsString::from),
                );
            }
            None => args.extend(["-map", "0", "-c", "copy"].map(OsString::from)),
        }
        for (key, value) in tags.pairs() {
            args.push("-metadata".into());
            args.push(format!("{key}={value}").into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}
