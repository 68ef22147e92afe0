use criterion::{black_box, criterion_group, criterion_main, Criterion};

use reproj::{Context, Point};

fn lonlat_grid(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            Point::new(12.0 + t * 6.0, 45.0 + t * 10.0)
        })
        .collect()
}

fn bench_projection_throughput(c: &mut Criterion) {
    let n = 100_000_usize;
    let ctx = Context::new();
    let points = lonlat_grid(n);

    for (name, dest) in [
        ("utm33", "EPSG:32633"),
        ("webmerc", "EPSG:3857"),
        ("laea", "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80"),
        ("lcc", "+proj=lcc +lat_1=44 +lat_2=49 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 +ellps=GRS80"),
    ] {
        let conv = ctx.converter("EPSG:4326", dest).unwrap();
        c.bench_function(&format!("forward_{name}_100k"), |b| {
            b.iter(|| {
                for p in &points {
                    black_box(conv.forward(*p).unwrap());
                }
            });
        });

        let projected: Vec<Point> = points.iter().map(|p| conv.forward(*p).unwrap()).collect();
        c.bench_function(&format!("inverse_{name}_100k"), |b| {
            b.iter(|| {
                for p in &projected {
                    black_box(conv.inverse(*p).unwrap());
                }
            });
        });
    }
}

fn bench_datum_shift(c: &mut Criterion) {
    let n = 100_000_usize;
    let ctx = Context::new();
    let points = lonlat_grid(n);

    let helmert = ctx
        .converter("EPSG:4326", "+proj=longlat +ellps=bessel +towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7")
        .unwrap();
    c.bench_function("datum_7param_100k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(helmert.forward(*p).unwrap());
            }
        });
    });

    let pivot = ctx
        .converter(
            "+proj=longlat +datum=OSGB36",
            "+proj=utm +zone=33 +ellps=intl +towgs84=-87,-98,-121",
        )
        .unwrap();
    c.bench_function("datum_pivot_utm_100k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(pivot.forward(*p).unwrap());
            }
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let ctx = Context::new();
    let wkt = r#"PROJCS["OSGB 1936 / British National Grid",GEOGCS["OSGB 1936",DATUM["OSGB_1936",SPHEROID["Airy 1830",6377563.396,299.3249646,AUTHORITY["EPSG","7001"]],TOWGS84[446.448,-125.157,542.06,0.15,0.247,0.842,-20.489],AUTHORITY["EPSG","6277"]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",49],PARAMETER["central_meridian",-2],PARAMETER["scale_factor",0.9996012717],PARAMETER["false_easting",400000],PARAMETER["false_northing",-100000],UNIT["metre",1],AUTHORITY["EPSG","27700"]]"#;

    c.bench_function("parse_projstring", |b| {
        b.iter(|| black_box(ctx.parse("+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +datum=OSGB36").unwrap()));
    });
    c.bench_function("parse_wkt", |b| {
        b.iter(|| black_box(ctx.parse(wkt).unwrap()));
    });
    c.bench_function("parse_code", |b| {
        b.iter(|| black_box(ctx.parse("urn:ogc:def:crs:EPSG::32633").unwrap()));
    });
}

criterion_group!(benches, bench_projection_throughput, bench_datum_shift, bench_parse);
criterion_main!(benches);
