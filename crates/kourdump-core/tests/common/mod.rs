#![allow(dead_code)]

pub mod http_server;

/// Landing page in the shape the fetcher expects, with assets under `build_url`.
pub fn landing_page(version: &str, build_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <script>
      var buildUrl = isMobile ? "Build/mobile" : "{build_url}";
      var config = {{
        dataUrl: buildUrl + "/web.data.br",
        frameworkUrl: buildUrl + "/framework.js.br",
        codeUrl: buildUrl + "/game.wasm.br",
        companyName: "Kour",
        productName: "Kour.io",
        productVersion: "{version}",
      }};
    </script>
  </body>
</html>
"#
    )
}

/// In-memory `.tar.gz` with the given `(path, contents)` entries.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, *path, *data).unwrap();
    }
    let tar = builder.into_inner().unwrap();
    let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut gz, &tar).unwrap();
    gz.finish().unwrap()
}

/// Write an executable shell script (unix only).
#[cfg(unix)]
pub fn write_script(path: &std::path::Path, body: &str) {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
