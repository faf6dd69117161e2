//! WGSL sources for the three programs.
//!
//! Field order in each `Globals` struct must match the registration order of
//! the matching uniform layout in `renderer.rs`: every scalar and vec3 slot
//! is a `vec4` here, matrices are `mat4x4`.

pub const SCENE_SHADER: &str = r#"
struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    constant_term: vec4<f32>,
    linear_term: vec4<f32>,
    quadratic_term: vec4<f32>,
}

struct SpotLight {
    position: vec4<f32>,
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    constant_term: vec4<f32>,
    linear_term: vec4<f32>,
    quadratic_term: vec4<f32>,
    cut_off: vec4<f32>,
    outer_cut_off: vec4<f32>,
}

const POINT_LIGHT_COUNT: u32 = 2u;

struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    model: mat4x4<f32>,
    object_color: vec4<f32>,
    view_pos: vec4<f32>,
    shininess: vec4<f32>,
    point_lights: array<PointLight, 2>,
    spot_light: SpotLight,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_pos = globals.model * vec4<f32>(input.position, 1.0);
    out.clip_position = globals.projection * globals.view * world_pos;
    out.world_pos = world_pos.xyz;
    out.normal = normalize((globals.model * vec4<f32>(input.normal, 0.0)).xyz);
    return out;
}

fn point_light_contribution(
    light: PointLight,
    normal: vec3<f32>,
    world_pos: vec3<f32>,
    view_dir: vec3<f32>,
) -> vec3<f32> {
    let to_light = light.position.xyz - world_pos;
    let light_dir = normalize(to_light);
    let diffuse = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let specular = pow(max(dot(view_dir, reflect_dir), 0.0), globals.shininess.x);
    let dist = length(to_light);
    let attenuation = 1.0
        / (light.constant_term.x
            + light.linear_term.x * dist
            + light.quadratic_term.x * dist * dist);
    return (light.ambient.xyz + light.diffuse.xyz * diffuse + light.specular.xyz * specular)
        * attenuation;
}

fn spot_light_contribution(
    normal: vec3<f32>,
    world_pos: vec3<f32>,
    view_dir: vec3<f32>,
) -> vec3<f32> {
    let spot = globals.spot_light;
    let to_light = spot.position.xyz - world_pos;
    let light_dir = normalize(to_light);
    let diffuse = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let specular = pow(max(dot(view_dir, reflect_dir), 0.0), globals.shininess.x);
    let dist = length(to_light);
    let attenuation = 1.0
        / (spot.constant_term.x
            + spot.linear_term.x * dist
            + spot.quadratic_term.x * dist * dist);
    let theta = dot(light_dir, normalize(-spot.direction.xyz));
    let epsilon = spot.cut_off.x - spot.outer_cut_off.x;
    let intensity = clamp((theta - spot.outer_cut_off.x) / epsilon, 0.0, 1.0);
    return (spot.ambient.xyz
        + (spot.diffuse.xyz * diffuse + spot.specular.xyz * specular) * intensity)
        * attenuation;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let view_dir = normalize(globals.view_pos.xyz - input.world_pos);
    var lit = vec3<f32>(0.0);
    for (var i = 0u; i < POINT_LIGHT_COUNT; i = i + 1u) {
        lit += point_light_contribution(globals.point_lights[i], normal, input.world_pos, view_dir);
    }
    lit += spot_light_contribution(normal, input.world_pos, view_dir);
    return vec4<f32>(lit * globals.object_color.xyz, 1.0);
}
"#;

pub const OUTLINE_SHADER: &str = r#"
struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    model: mat4x4<f32>,
    outline_color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> @builtin(position) vec4<f32> {
    return globals.projection * globals.view * globals.model * vec4<f32>(input.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(globals.outline_color.xyz, 1.0);
}
"#;

pub const MARKER_SHADER: &str = r#"
struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    light_color: vec4<f32>,
}

struct MarkerConstants {
    model: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> marker: MarkerConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> @builtin(position) vec4<f32> {
    return globals.projection * globals.view * marker.model * vec4<f32>(input.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(globals.light_color.xyz, 1.0);
}
"#;
