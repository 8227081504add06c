/// WGSL shader for Phong-lit boxes under directional lights.
///
/// Boxes are instances of one unit cube; each instance carries its model
/// matrix, diffuse color and specular color with shininess in `w`.
pub const PHONG_SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct Light {
    direction: vec4<f32>,
    color: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, 4>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) specular: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) specular: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    // Inverse-transpose for a TRS matrix: divide by squared column scale.
    let scale = vec3<f32>(
        length(instance.model_0.xyz),
        length(instance.model_1.xyz),
        length(instance.model_2.xyz),
    );
    let world_normal = (model * vec4<f32>(vertex.normal / (scale * scale), 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.specular = instance.specular;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let view_dir = normalize(uniforms.camera_position.xyz - in.world_position);
    let count = min(uniforms.light_count.x, MAX_LIGHTS);

    var lit = vec3<f32>(0.0);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = uniforms.lights[i];
        let to_light = normalize(light.direction.xyz);
        let diffuse = max(dot(normal, to_light), 0.0);
        if (diffuse > 0.0) {
            let half_dir = normalize(to_light + view_dir);
            let highlight = pow(max(dot(normal, half_dir), 0.0), in.specular.w);
            lit += light.color.rgb * (in.color.rgb * diffuse + in.specular.rgb * highlight);
        }
    }
    return vec4<f32>(lit, in.color.a);
}
"#;
