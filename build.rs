use semver::Version;
use std::env;

fn main() {
    // gdal-sys links against GDAL and forwards the library version as
    // `cargo:version_number` (e.g. 3080100 for 3.8.1).
    let gdal_version_string = env::var("DEP_GDAL_VERSION_NUMBER")
        .expect("gdal-sys did not report the GDAL version number");
    println!("GDAL version number: \"{gdal_version_string}\"");

    let gdal_version = gdal_version_string
        .parse::<u64>()
        .expect("Could not convert the GDAL version number into an integer");
    let major = gdal_version / 1_000_000;
    let minor = (gdal_version - major * 1_000_000) / 10_000;
    let patch = (gdal_version - major * 1_000_000 - minor * 10_000) / 100;
    let detected_version = Version::new(major, minor, patch);

    if detected_version.major < 2 {
        panic!("GDAL version must be >= 2.0, found {detected_version}");
    }

    println!("cargo:rustc-cfg=major_is_{}", detected_version.major);

    for major in 3..=detected_version.major {
        println!("cargo:rustc-cfg=major_ge_{major}");
    }

    for minor in 1..=detected_version.minor {
        println!("cargo:rustc-cfg=minor_ge_{minor}");
    }
}
