use std::{
    path::PathBuf,
};

use structopt::{
    clap::{
        AppSettings,
    },
    StructOpt,
};

#[derive(Clone, StructOpt, Debug)]
#[structopt(setting = AppSettings::DeriveDisplayOrder)]
#[structopt(setting = AppSettings::AllowLeadingHyphen)]
pub struct CommonCliArgs {
    /// base url of the geometry collaborator service
    #[structopt(long = "api-url", default_value = "http://127.0.0.1:8000")]
    pub api_url: String,
    /// problem number to load
    #[structopt(long = "problem", default_value = "1")]
    pub problem: usize,
    /// file with pose to import on start / export on demand
    #[structopt(long = "pose-file", default_value = "./poses/1.pose")]
    pub pose_file: PathBuf,
    /// stored solution id to load instead of the pose file
    #[structopt(long = "solution-id")]
    pub solution_id: Option<String>,
}
